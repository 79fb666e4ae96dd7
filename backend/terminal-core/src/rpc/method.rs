use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

/// Every method the terminal answers, by dispatch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    InletOpen,
    InletClose,
    OutletClose,
    EvalNew,
    EvalSpectrum,
    EvalHydro,
    EvalReturn,
    EvalStore,
    StorageExtract,
    StorageOccupy,
    StorageRelease,
    Status,
    Call,
    Hardware,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 14] = [
        RpcMethod::InletOpen,
        RpcMethod::InletClose,
        RpcMethod::OutletClose,
        RpcMethod::EvalNew,
        RpcMethod::EvalSpectrum,
        RpcMethod::EvalHydro,
        RpcMethod::EvalReturn,
        RpcMethod::EvalStore,
        RpcMethod::StorageExtract,
        RpcMethod::StorageOccupy,
        RpcMethod::StorageRelease,
        RpcMethod::Status,
        RpcMethod::Call,
        RpcMethod::Hardware,
    ];

    pub fn dispatch_name(&self) -> &'static str {
        match self {
            RpcMethod::InletOpen => "InletOpen",
            RpcMethod::InletClose => "InletClose",
            RpcMethod::OutletClose => "OutletClose",
            RpcMethod::EvalNew => "EvalNew",
            RpcMethod::EvalSpectrum => "EvalSpectrum",
            RpcMethod::EvalHydro => "EvalHydro",
            RpcMethod::EvalReturn => "EvalReturn",
            RpcMethod::EvalStore => "EvalStore",
            RpcMethod::StorageExtract => "StorageExtract",
            RpcMethod::StorageOccupy => "StorageOccupy",
            RpcMethod::StorageRelease => "StorageRelease",
            RpcMethod::Status => "Status",
            RpcMethod::Call => "Call",
            RpcMethod::Hardware => "Hardware",
        }
    }

    /// Methods that still answer while the module is broken.
    pub fn allowed_when_broken(&self) -> bool {
        matches!(self, RpcMethod::Status)
    }
}

impl Display for RpcMethod {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.dispatch_name())
    }
}

impl FromStr for RpcMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RpcMethod::ALL
            .into_iter()
            .find(|method| method.dispatch_name() == s)
            .ok_or_else(|| s.to_string())
    }
}
