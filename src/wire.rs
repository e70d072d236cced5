// 📨 Wire format shared by the HTTP server and the HTTP client
//
// Every response is `{ "head": { "message", "reasonCode" }, "body": ... }`.

use crate::contract::ContractId;
use serde::{Deserialize, Serialize};

/// Short result codes carried in every response head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    GeneralSuccess,
    CreateSuccess,
    CreateError,
    DeleteSuccess,
    DeleteMissing,
    DeleteError,
    UpdateSuccess,
    UpdateError,
    ImportSuccess,
    ImportFailed,
    ExportSuccess,
    ExportFailed,
    GeneralError,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 13] = [
        ReasonCode::GeneralSuccess,
        ReasonCode::CreateSuccess,
        ReasonCode::CreateError,
        ReasonCode::DeleteSuccess,
        ReasonCode::DeleteMissing,
        ReasonCode::DeleteError,
        ReasonCode::UpdateSuccess,
        ReasonCode::UpdateError,
        ReasonCode::ImportSuccess,
        ReasonCode::ImportFailed,
        ReasonCode::ExportSuccess,
        ReasonCode::ExportFailed,
        ReasonCode::GeneralError,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReasonCode::GeneralSuccess => "RC_GEN_00",
            ReasonCode::CreateSuccess => "RC_ADD_00",
            ReasonCode::CreateError => "RC_ADD_10",
            ReasonCode::DeleteSuccess => "RC_DEL_00",
            ReasonCode::DeleteMissing => "RC_DEL_10",
            ReasonCode::DeleteError => "RC_DEL_20",
            ReasonCode::UpdateSuccess => "RC_UPD_00",
            ReasonCode::UpdateError => "RC_UPD_10",
            ReasonCode::ImportSuccess => "RC_IMP_00",
            ReasonCode::ImportFailed => "RC_IMP_10",
            ReasonCode::ExportSuccess => "RC_EXP_00",
            ReasonCode::ExportFailed => "RC_EXP_10",
            ReasonCode::GeneralError => "RC_GEN_99",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReasonCode::GeneralSuccess => "action successful",
            ReasonCode::CreateSuccess => "contract created",
            ReasonCode::CreateError => "contract creation error",
            ReasonCode::DeleteSuccess => "contract deleted",
            ReasonCode::DeleteMissing => "contract for deletion missing",
            ReasonCode::DeleteError => "general error while deletion",
            ReasonCode::UpdateSuccess => "contract updated",
            ReasonCode::UpdateError => "contract update failed",
            ReasonCode::ImportSuccess => "all contracts imported",
            ReasonCode::ImportFailed => "failed to import all contracts",
            ReasonCode::ExportSuccess => "successfully exported contracts",
            ReasonCode::ExportFailed => "failed to export all contracts",
            ReasonCode::GeneralError => "action failed",
        }
    }

    pub fn from_code(code: &str) -> Option<ReasonCode> {
        Self::ALL.iter().copied().find(|rc| rc.code() == code)
    }

    pub fn is_success(&self) -> bool {
        self.code().ends_with("_00")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHead {
    pub message: String,
    pub reason_code: String,
}

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub head: ResponseHead,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn new(code: ReasonCode, body: T) -> Self {
        ApiResponse {
            head: ResponseHead {
                message: code.description().to_string(),
                reason_code: code.code().to_string(),
            },
            body,
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        ReasonCode::from_code(&self.head.reason_code)
    }
}

/// `PATCH /change/:id` - one key per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub key: String,
    pub value: serde_json::Value,
}

/// `POST /delete` - `id` is authoritative, `name` is only cross-checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: ContractId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `PUT /import`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub filepath: String,
    #[serde(default)]
    pub overwrite: bool,
}

/// `POST /export`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub filepath: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_round_trip() {
        for rc in ReasonCode::ALL {
            assert_eq!(ReasonCode::from_code(rc.code()), Some(rc));
        }
        assert_eq!(ReasonCode::from_code("RC_XXX"), None);
    }

    #[test]
    fn test_success_codes() {
        assert!(ReasonCode::UpdateSuccess.is_success());
        assert!(!ReasonCode::DeleteMissing.is_success());
        assert!(!ReasonCode::GeneralError.is_success());
    }

    #[test]
    fn test_envelope_shape() {
        let response = ApiResponse::new(ReasonCode::DeleteSuccess, serde_json::json!({}));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["head"]["reasonCode"], "RC_DEL_00");
        assert_eq!(json["head"]["message"], "contract deleted");
        assert!(json["body"].is_object());
    }

    #[test]
    fn test_delete_request_name_is_optional() {
        let request: DeleteRequest = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(request.id, 3);
        assert_eq!(request.name, None);
    }
}
