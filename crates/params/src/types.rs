#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Address,
    Uint256,
    Int256,
    Bytes32,
    Bytes,
    Sender,
    Deployment,
    Artifact,
}

impl ParamType {
    pub fn is_meta(self) -> bool {
        matches!(self, ParamType::Sender | ParamType::Deployment | ParamType::Artifact)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "string" => ParamType::String,
            "address" => ParamType::Address,
            "uint256" => ParamType::Uint256,
            "int256" => ParamType::Int256,
            "bytes32" => ParamType::Bytes32,
            "bytes" => ParamType::Bytes,
            "sender" => ParamType::Sender,
            "deployment" => ParamType::Deployment,
            "artifact" => ParamType::Artifact,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub ty: ParamType,
    pub optional: bool,
    pub name: String,
    pub description: String,
}
