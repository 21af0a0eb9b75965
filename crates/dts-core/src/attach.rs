//! Change-request attachment submissions

use crate::error::AttachmentError;
use dts_model::{ChangeTarget, ChangeType, PendingChange};

/// Attach form as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRequest {
    pub change_type: ChangeType,
    /// Only read when `change_type` is `Existing`
    pub change_id: Option<String>,
    pub summary: String,
    pub approver: String,
}

impl AttachmentRequest {
    /// Request opening a new change
    #[inline]
    #[must_use]
    pub fn new_change(summary: impl Into<String>, approver: impl Into<String>) -> Self {
        Self {
            change_type: ChangeType::New,
            change_id: None,
            summary: summary.into(),
            approver: approver.into(),
        }
    }

    /// Request joining a pending change
    #[inline]
    #[must_use]
    pub fn existing(
        change_id: impl Into<String>,
        summary: impl Into<String>,
        approver: impl Into<String>,
    ) -> Self {
        Self {
            change_type: ChangeType::Existing,
            change_id: Some(change_id.into()),
            summary: summary.into(),
            approver: approver.into(),
        }
    }

    /// Whether the pending-change list is needed to validate this request
    #[inline]
    #[must_use]
    pub fn needs_pending_changes(&self) -> bool {
        self.change_type == ChangeType::Existing
            && self.change_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

/// Check a request against the approver roster and pending changes
///
/// `pending` is only consulted for existing-change requests.
pub(crate) fn validate(
    request: &AttachmentRequest,
    approvers: &[String],
    pending: &[PendingChange],
) -> Result<ChangeTarget, AttachmentError> {
    if request.summary.trim().is_empty() {
        return Err(AttachmentError::EmptySummary);
    }

    let approver = request.approver.trim();
    if approver.is_empty() {
        return Err(AttachmentError::MissingApprover);
    }
    if !approvers.iter().any(|a| a == approver) {
        return Err(AttachmentError::UnknownApprover(approver.to_string()));
    }

    match request.change_type {
        ChangeType::New => Ok(ChangeTarget::New),
        ChangeType::Existing => {
            let change_id = request
                .change_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or(AttachmentError::MissingChangeId)?;

            if pending.iter().any(|c| c.id == change_id) {
                Ok(ChangeTarget::Existing {
                    change_id: change_id.to_string(),
                })
            } else {
                Err(AttachmentError::UnknownChangeId(change_id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        vec!["sarah.johnson".to_string(), "michael.chen".to_string()]
    }

    fn pending() -> Vec<PendingChange> {
        vec![PendingChange::new("CHG-1", "rules", "Pending Approval")]
    }

    #[test]
    fn new_change_accepted() {
        let target = validate(
            &AttachmentRequest::new_change("test", "sarah.johnson"),
            &roster(),
            &[],
        )
        .unwrap();
        assert_eq!(target, ChangeTarget::New);
    }

    #[test]
    fn stray_change_id_ignored_for_new() {
        let mut request = AttachmentRequest::new_change("test", "sarah.johnson");
        request.change_id = Some("CHG-1".to_string());
        assert_eq!(validate(&request, &roster(), &[]).unwrap(), ChangeTarget::New);
        assert!(!request.needs_pending_changes());
    }

    #[test]
    fn summary_required() {
        let err = validate(
            &AttachmentRequest::new_change("   ", "sarah.johnson"),
            &roster(),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, AttachmentError::EmptySummary));
    }

    #[test]
    fn approver_required_and_on_roster() {
        let err = validate(&AttachmentRequest::new_change("s", ""), &roster(), &[]).unwrap_err();
        assert!(matches!(err, AttachmentError::MissingApprover));

        let err =
            validate(&AttachmentRequest::new_change("s", "mallory"), &roster(), &[]).unwrap_err();
        assert!(matches!(err, AttachmentError::UnknownApprover(name) if name == "mallory"));
    }

    #[test]
    fn existing_requires_pending_change_id() {
        let mut request = AttachmentRequest::existing("", "s", "michael.chen");
        assert!(matches!(
            validate(&request, &roster(), &pending()),
            Err(AttachmentError::MissingChangeId)
        ));

        request.change_id = None;
        assert!(matches!(
            validate(&request, &roster(), &pending()),
            Err(AttachmentError::MissingChangeId)
        ));

        let request = AttachmentRequest::existing("CHG-9", "s", "michael.chen");
        assert!(matches!(
            validate(&request, &roster(), &pending()),
            Err(AttachmentError::UnknownChangeId(id)) if id == "CHG-9"
        ));

        let request = AttachmentRequest::existing("CHG-1", "s", "michael.chen");
        assert!(request.needs_pending_changes());
        assert_eq!(
            validate(&request, &roster(), &pending()).unwrap(),
            ChangeTarget::Existing {
                change_id: "CHG-1".to_string()
            }
        );
    }
}
