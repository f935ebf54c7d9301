//! Selector-based call decoding and human value formatting (§4.3).

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Selector};

use crate::registry::AbiRegistry;

#[derive(Debug, Clone)]
pub enum DecodedCall {
    Constructor { inputs: Vec<DynSolValue> },
    Method { name: String, selector: Selector, inputs: Vec<DynSolValue>, outputs: Vec<DynSolValue> },
    Unknown { selector: Option<Selector> },
}

impl AbiRegistry {
    /// Decodes one call. `to = None` means a deployment transaction, decoded
    /// against `constructor_abi`'s constructor inputs (§4.3). `return_data`
    /// is only meaningful for `Method` — constructors and unknown calls never
    /// populate `outputs`.
    pub fn decode_call(&self, to: Option<Address>, data: &[u8], return_data: &[u8], constructor_abi: Option<&JsonAbi>) -> DecodedCall {
        let Some(to) = to else {
            return decode_constructor(constructor_abi, data);
        };

        if data.len() < 4 {
            return DecodedCall::Unknown { selector: None };
        }
        let selector = Selector::from_slice(&data[..4]);

        let abi = match self.abi_for(to) {
            Some(abi) => abi,
            None => return DecodedCall::Unknown { selector: Some(selector) },
        };

        let Some(function) = abi.functions().find(|f| f.selector() == selector) else {
            return DecodedCall::Unknown { selector: Some(selector) };
        };

        let inputs = function.abi_decode_input(&data[4..]).unwrap_or_default();
        let outputs = if return_data.is_empty() { Vec::new() } else { function.abi_decode_output(return_data).unwrap_or_default() };

        DecodedCall::Method { name: function.name.clone(), selector, inputs, outputs }
    }
}

fn decode_constructor(constructor_abi: Option<&JsonAbi>, data: &[u8]) -> DecodedCall {
    let Some(constructor) = constructor_abi.and_then(|abi| abi.constructor.as_ref()) else {
        return DecodedCall::Constructor { inputs: Vec::new() };
    };
    let inputs = constructor.abi_decode_input(data).unwrap_or_default();
    DecodedCall::Constructor { inputs }
}

/// Renders a decoded value per §4.3's formatting rules: EIP-55 addresses,
/// decimal integers with a token-amount heuristic, length-suffixed long
/// bytes, truncated strings, and JSON-encoded truncated fallback for
/// everything else (arrays, tuples, bools).
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(addr) => treb_common::address_hex(addr),
        DynSolValue::Uint(value, _) => format_integer(&value.to_string(), false),
        DynSolValue::Int(value, _) => format_integer(&value.to_string(), true),
        DynSolValue::Bytes(bytes) => format_bytes(bytes),
        DynSolValue::FixedBytes(word, size) => format_bytes(&word[..*size]),
        DynSolValue::String(s) => format_string(s),
        other => format_fallback(other),
    }
}

/// Large values divisible by a clean power of ten are rendered as
/// `<mantissa> × 10^<N>` (e.g. token amounts in base units); everything else
/// prints as a plain decimal.
fn format_integer(decimal: &str, negative_capable: bool) -> String {
    let _ = negative_capable;
    let (sign, digits) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal),
    };
    if digits.len() < 7 || digits.chars().any(|c| !c.is_ascii_digit()) {
        return decimal.to_string();
    }
    for exponent in [18usize, 9, 6] {
        if digits.len() <= exponent {
            continue;
        }
        let (mantissa, trailing) = digits.split_at(digits.len() - exponent);
        if trailing.chars().all(|c| c == '0') && !mantissa.is_empty() {
            return format!("{sign}{mantissa} × 10^{exponent}");
        }
    }
    decimal.to_string()
}

fn format_bytes(bytes: &[u8]) -> String {
    let hex = format!("0x{}", hex::encode(bytes));
    if bytes.len() > 32 {
        format!("{hex} ({} bytes)", bytes.len())
    } else {
        hex
    }
}

fn format_string(s: &str) -> String {
    if s.chars().count() > 50 {
        let truncated: String = s.chars().take(50).collect();
        format!("{truncated:?}…")
    } else {
        format!("{s:?}")
    }
}

fn format_fallback(value: &DynSolValue) -> String {
    let json = serde_json::to_string(&format!("{value:?}")).unwrap_or_default();
    if json.len() > 100 {
        format!("{}…", &json[..100])
    } else {
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_address_as_eip55() {
        let addr = Address::repeat_byte(0xAB);
        let formatted = format_value(&DynSolValue::Address(addr));
        assert!(formatted.starts_with("0x"));
        assert_ne!(formatted, format!("0x{}", hex::encode(addr)));
    }

    #[test]
    fn large_divisible_uint_uses_token_heuristic() {
        assert_eq!(format_integer("1000000000000000000", false), "1 × 10^18");
        assert_eq!(format_integer("1500000000000000000", false), "1500000000 × 10^9");
    }

    #[test]
    fn small_uint_prints_plain_decimal() {
        assert_eq!(format_integer("42", false), "42");
    }

    #[test]
    fn long_bytes_get_length_suffix() {
        let bytes = vec![0u8; 64];
        let formatted = format_bytes(&bytes);
        assert!(formatted.ends_with("(64 bytes)"));
    }

    #[test]
    fn long_string_is_truncated() {
        let s = "x".repeat(60);
        let formatted = format_string(&s);
        assert!(formatted.contains('…'));
    }

    #[test]
    fn unknown_call_without_registered_abi() {
        let registry = AbiRegistry::new();
        let data = [0xde, 0xad, 0xbe, 0xef];
        let decoded = registry.decode_call(Some(Address::repeat_byte(1)), &data, &[], None);
        assert!(matches!(decoded, DecodedCall::Unknown { selector: Some(_) }));
    }
}
