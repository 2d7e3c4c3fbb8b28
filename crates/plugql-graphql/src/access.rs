//! Access check for GraphQL requests.
//!
//! Two permissions gate execution: one allows arbitrary queries, the other
//! only persisted queries referenced by id. A request is a batch of
//! operations; a single inline query in the batch makes the whole request
//! arbitrary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Permission to execute any query.
pub const EXECUTE_ANY: &str = "execute graphql requests";

/// Permission to execute persisted queries only.
pub const EXECUTE_PERSISTED: &str = "execute persisted graphql requests";

/// The account a request runs as.
pub trait Account {
    fn has_permission(&self, permission: &str) -> bool;
}

/// An account holding a fixed set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    permissions: HashSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Account for PermissionSet {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// One operation of a (possibly batched) GraphQL request, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Id of a persisted query
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

impl OperationParams {
    pub fn inline(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn persisted(query_id: impl Into<String>) -> Self {
        Self {
            query_id: Some(query_id.into()),
            ..Self::default()
        }
    }

    /// Whether the operation carries query text rather than a persisted id.
    pub fn has_inline_query(&self) -> bool {
        self.query.as_deref().is_some_and(|query| !query.is_empty())
    }

    /// Reads a request body holding one operation or a batch of them.
    pub fn parse_batch(body: serde_json::Value) -> Result<Vec<Self>, serde_json::Error> {
        match body {
            serde_json::Value::Array(_) => serde_json::from_value(body),
            single => Ok(vec![serde_json::from_value(single)?]),
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    Allowed,
    /// Not granted here; other checks may still grant access.
    Neutral { reason: String },
}

impl AccessResult {
    fn allowed_if_has_permission(account: &dyn Account, permission: &str) -> Self {
        if account.has_permission(permission) {
            Self::Allowed
        } else {
            Self::Neutral {
                reason: format!("The '{permission}' permission is required."),
            }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether an account may execute a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryAccessCheck;

impl QueryAccessCheck {
    pub fn access(&self, account: &dyn Account, operations: &[OperationParams]) -> AccessResult {
        if account.has_permission(EXECUTE_ANY) {
            trace!("Account may execute any query");
            return AccessResult::Allowed;
        }

        if let Some(operation) = operations.iter().find(|op| op.has_inline_query()) {
            debug!(
                operation = operation.operation_name.as_deref().unwrap_or("<anonymous>"),
                "Inline query requires full execute permission"
            );
            return AccessResult::allowed_if_has_permission(account, EXECUTE_ANY);
        }

        AccessResult::allowed_if_has_permission(account, EXECUTE_PERSISTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_any_allows_everything() {
        let account = PermissionSet::new().with(EXECUTE_ANY);
        let check = QueryAccessCheck;

        assert!(check.access(&account, &[OperationParams::inline("{ hello }")]).is_allowed());
        assert!(check.access(&account, &[OperationParams::persisted("abc")]).is_allowed());
        assert!(check.access(&account, &[]).is_allowed());
    }

    #[test]
    fn test_persisted_permission() {
        let account = PermissionSet::new().with(EXECUTE_PERSISTED);
        let check = QueryAccessCheck;

        assert!(check.access(&account, &[OperationParams::persisted("abc")]).is_allowed());

        let result = check.access(
            &account,
            &[OperationParams::persisted("abc"), OperationParams::inline("{ hello }")],
        );
        assert_eq!(
            result,
            AccessResult::Neutral {
                reason: "The 'execute graphql requests' permission is required.".into()
            }
        );
    }

    #[test]
    fn test_empty_query_counts_as_persisted() {
        let account = PermissionSet::new().with(EXECUTE_PERSISTED);
        let operation = OperationParams {
            query: Some(String::new()),
            query_id: Some("abc".into()),
            ..OperationParams::default()
        };
        assert!(QueryAccessCheck.access(&account, &[operation]).is_allowed());
    }

    #[test]
    fn test_no_permissions() {
        let account = PermissionSet::new();
        let result = QueryAccessCheck.access(&account, &[OperationParams::persisted("abc")]);
        assert!(!result.is_allowed());
    }

    #[test]
    fn test_parse_batch() {
        let single = OperationParams::parse_batch(serde_json::json!({
            "query": "{ hello }",
            "operationName": "Hello"
        }))
        .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].operation_name.as_deref(), Some("Hello"));

        let batch = OperationParams::parse_batch(serde_json::json!([
            { "id": "abc" },
            { "queryId": "def", "variables": { "x": 1 } }
        ]))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].query_id.as_deref(), Some("abc"));
        assert!(!batch[1].has_inline_query());
    }

    #[test]
    fn test_permission_set_from_iter() {
        let account: PermissionSet = [EXECUTE_ANY, EXECUTE_PERSISTED].into_iter().collect();
        assert!(account.has_permission(EXECUTE_PERSISTED));
    }
}
