//! Privilege deltas and attribution of observed grants

use super::identity::GrantIdentity;
use super::target::normalize_type_name;
use crate::api::identifier;
use std::collections::BTreeSet;

/// Privileges to grant and revoke to move from one set to another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeDelta {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl PrivilegeDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn apply(&self, old: &BTreeSet<String>) -> BTreeSet<String> {
        old.difference(&self.to_remove)
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

pub fn diff(old: &BTreeSet<String>, new: &BTreeSet<String>) -> PrivilegeDelta {
    PrivilegeDelta {
        to_add: new.difference(old).cloned().collect(),
        to_remove: old.difference(new).cloned().collect(),
    }
}

/// One row of SHOW GRANTS ON / SHOW FUTURE GRANTS IN
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedGrant {
    pub privilege: String,
    /// `granted_on`, or `grant_on` for future grants
    pub granted_on: String,
    pub name: String,
    pub granted_to: String,
    pub grantee_name: String,
    pub grant_option: bool,
    /// Empty for future grants
    pub granted_by: String,
}

/// Privileges of `identity` confirmed by `observed`, in the identity's
/// spelling. Rows for other grantees, other options, other object types or
/// privileges outside the identity are ignored.
pub fn attributed_privileges(
    identity: &GrantIdentity,
    observed: &[ObservedGrant],
) -> BTreeSet<String> {
    let wanted = identity.privileges.names();
    let granted_on = identity.target.granted_on();
    let future = identity.target.is_future();

    observed
        .iter()
        .filter(|grant| grant.grant_option == identity.with_grant_option)
        .filter(|grant| identifier::unqualified(&grant.grantee_name) == identity.role_name)
        .filter(|grant| {
            grant.granted_to.is_empty() || normalize_type_name(&grant.granted_to) == "DATABASE ROLE"
        })
        .filter(|grant| future || !grant.granted_by.trim().is_empty())
        .filter(|grant| normalize_type_name(&grant.granted_on) == granted_on)
        .filter_map(|grant| {
            wanted
                .iter()
                .find(|p| p.eq_ignore_ascii_case(grant.privilege.trim()))
                .cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grants::target::{
        BulkScope, BulkTarget, GrantTarget, PluralObjectType, PrivilegeSet, SchemaObjectTarget,
    };

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn row(privilege: &str, granted_on: &str, grantee: &str, grant_option: bool) -> ObservedGrant {
        ObservedGrant {
            privilege: privilege.to_string(),
            granted_on: granted_on.to_string(),
            name: "DB1".to_string(),
            granted_to: "DATABASE_ROLE".to_string(),
            grantee_name: grantee.to_string(),
            grant_option,
            granted_by: "SYSADMIN".to_string(),
        }
    }

    fn database_identity(privileges: &[&str]) -> GrantIdentity {
        GrantIdentity::new(
            "R1",
            "DB1",
            PrivilegeSet::named(privileges.iter().copied()),
            false,
            GrantTarget::Database,
        )
        .unwrap()
    }

    #[test]
    fn diff_adds_new_privileges_only() {
        let delta = diff(
            &set(&["MONITOR USAGE"]),
            &set(&["MONITOR USAGE", "MANAGE GRANTS"]),
        );
        assert_eq!(delta.to_add, set(&["MANAGE GRANTS"]));
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn diff_is_disjoint_and_reaches_the_new_set() {
        let cases = [
            (set(&[]), set(&["USAGE"])),
            (set(&["USAGE", "MONITOR"]), set(&["MONITOR", "CREATE SCHEMA"])),
            (set(&["USAGE"]), set(&[])),
            (set(&["USAGE"]), set(&["USAGE"])),
        ];
        for (old, new) in cases {
            let delta = diff(&old, &new);
            assert!(delta.to_add.is_disjoint(&delta.to_remove));
            assert_eq!(delta.apply(&old), new);
            assert_eq!(delta.is_empty(), old == new);
        }
    }

    #[test]
    fn only_privileges_of_the_identity_are_attributed() {
        let identity = database_identity(&["MONITOR USAGE"]);
        let observed = vec![
            row("MONITOR USAGE", "DATABASE", "R1", false),
            row("CREATE SCHEMA", "DATABASE", "R1", false),
        ];
        assert_eq!(
            attributed_privileges(&identity, &observed),
            set(&["MONITOR USAGE"])
        );
    }

    #[test]
    fn mismatched_rows_are_ignored() {
        let identity = database_identity(&["USAGE", "MONITOR"]);
        let mut unattributed = row("MONITOR", "DATABASE", "R1", false);
        unattributed.granted_by = String::new();
        let mut account_role = row("USAGE", "DATABASE", "R1", false);
        account_role.granted_to = "ROLE".to_string();

        let observed = vec![
            row("USAGE", "DATABASE", "R1", true),
            row("USAGE", "DATABASE", "OTHER", false),
            row("USAGE", "SCHEMA", "R1", false),
            unattributed,
            account_role,
        ];
        assert!(attributed_privileges(&identity, &observed).is_empty());
    }

    #[test]
    fn qualified_grantee_and_case_are_normalized() {
        let identity = database_identity(&["usage"]);
        let observed = vec![row("USAGE", "DATABASE", "\"DB1\".\"R1\"", false)];
        assert_eq!(attributed_privileges(&identity, &observed), set(&["usage"]));
    }

    #[test]
    fn future_grants_need_no_grantor() {
        let identity = GrantIdentity::new(
            "R1",
            "DB1",
            PrivilegeSet::named(["SELECT"]),
            false,
            GrantTarget::SchemaObject(SchemaObjectTarget::Future(BulkTarget {
                object_type_plural: PluralObjectType::DynamicTables,
                scope: BulkScope::Database,
            })),
        )
        .unwrap();

        let mut future = row("SELECT", "DYNAMIC_TABLE", "R1", false);
        future.granted_by = String::new();
        assert_eq!(
            attributed_privileges(&identity, &[future]),
            set(&["SELECT"])
        );
    }
}
