/*!
The two-tier permission model gating instance mutation: client-side admin permissions and
server-side data permissions. §4.8 "Permission model".
*/
use oldap_core::iri::Iri;
use oldap_errors::{key_error, no_permission_error, Result};
use oldap_store::session::UserRecord;

/// An admin-scope permission, held per-project (or globally, for `ADMIN_OLDAP`). §4.8:
/// "`ADMIN_OLDAP` on `oldap:SystemProject` is root; otherwise the actor must hold `ADMIN_CREATE` /
/// `ADMIN_RESOURCES` / etc. on the current project." The full set beyond the two named is
/// supplemented from `original_source/.../enums/adminpermissions.py`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminPermission {
    /// Root: holding this on `oldap:SystemProject` satisfies every admin check everywhere.
    AdminOldap,
    AdminUsers,
    AdminModel,
    AdminCreate,
    AdminResources,
    AdminPermissionSets,
}

impl AdminPermission {
    fn fragment(&self) -> &'static str {
        match self {
            AdminPermission::AdminOldap => "ADMIN_OLDAP",
            AdminPermission::AdminUsers => "ADMIN_USERS",
            AdminPermission::AdminModel => "ADMIN_MODEL",
            AdminPermission::AdminCreate => "ADMIN_CREATE",
            AdminPermission::AdminResources => "ADMIN_RESOURCES",
            AdminPermission::AdminPermissionSets => "ADMIN_PERMISSION_SETS",
        }
    }

    /// Parse from a permission-set member IRI's fragment, e.g. `oldap:ADMIN_CREATE`.
    pub fn from_iri(iri: &Iri) -> Result<Self> {
        const ALL: [AdminPermission; 6] = [
            AdminPermission::AdminOldap,
            AdminPermission::AdminUsers,
            AdminPermission::AdminModel,
            AdminPermission::AdminCreate,
            AdminPermission::AdminResources,
            AdminPermission::AdminPermissionSets,
        ];
        let fragment = iri.fragment();
        ALL.into_iter()
            .find(|permission| permission.fragment() == fragment)
            .ok_or_else(|| key_error(format!("'{fragment}' is not a known AdminPermission")))
    }
}

/// The numeric data-permission levels granted via `oldap:grantsPermission`. §4.8: "Required
/// levels: view = 2, extend = 3, update = 4, delete = 5, change-permissions = 6." `DataRestricted
/// = 1` is supplemented from `original_source/.../enums/datapermissions.py` as the tier below
/// `view`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DataPermission {
    DataRestricted = 1,
    DataView = 2,
    DataExtend = 3,
    DataUpdate = 4,
    DataDelete = 5,
    DataPermissions = 6,
}

impl DataPermission {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            1 => Ok(DataPermission::DataRestricted),
            2 => Ok(DataPermission::DataView),
            3 => Ok(DataPermission::DataExtend),
            4 => Ok(DataPermission::DataUpdate),
            5 => Ok(DataPermission::DataDelete),
            6 => Ok(DataPermission::DataPermissions),
            other => Err(key_error(format!("{other} is not a valid DataPermission level"))),
        }
    }
}

/// The action an instance operation performs, used to compute the required data-permission level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceAction {
    View,
    Extend,
    /// Any non-create mutation that does not touch `oldap:grantsPermission`. §4.8: "any
    /// non-create action upgrades to 'update'."
    Update,
    Delete,
    /// An update that touches `oldap:grantsPermission`. §4.8: "upgrades the required level to
    /// 'change-permissions'."
    ChangePermissions,
}

impl InstanceAction {
    pub fn required_level(self) -> DataPermission {
        match self {
            InstanceAction::View => DataPermission::DataView,
            InstanceAction::Extend => DataPermission::DataExtend,
            InstanceAction::Update => DataPermission::DataUpdate,
            InstanceAction::Delete => DataPermission::DataDelete,
            InstanceAction::ChangePermissions => DataPermission::DataPermissions,
        }
    }
}

/// `oldap:SystemProject`, the project `ADMIN_OLDAP` is checked against for root access.
pub const SYSTEM_PROJECT: &str = "oldap:SystemProject";

/// Check `actor` holds `required` (or root `ADMIN_OLDAP`) on `project`. §4.8: "computed
/// client-side from the session's user record." `held` is the caller-resolved set of
/// `(project, AdminPermission)` pairs the user's permission sets grant.
pub fn check_admin_permission(
    user: &UserRecord,
    held: &[(String, AdminPermission)],
    project: &str,
    required: AdminPermission,
) -> Result<()> {
    let is_root = held
        .iter()
        .any(|(p, perm)| p == SYSTEM_PROJECT && *perm == AdminPermission::AdminOldap);
    if is_root {
        return Ok(());
    }
    let has_it = held.iter().any(|(p, perm)| p == project && *perm == required);
    if has_it {
        return Ok(());
    }
    Err(no_permission_error(format!(
        "user '{}' lacks {:?} on project '{project}'",
        user.user_id,
        required
    )))
}

/// The SPARQL count query used to evaluate the data-permission check within an open transaction
/// (§4.8: "evaluated within the open transaction … a permission set attached to the resource via
/// `oldap:grantsPermission` must carry, for the acting user, a `DataPermission` value numerically
/// >= the required level"). A nonzero count means the check passes.
pub fn data_permission_count_query(instance_iri: &Iri, actor: &Iri, required: DataPermission) -> String {
    format!(
        "SELECT (COUNT(*) AS ?count) WHERE {{ {instance_iri} oldap:grantsPermission ?permSet . ?permSet oldap:givenToUser {actor} ; oldap:givenPermission ?level . FILTER(?level >= {}) }}",
        required.level()
    )
}

pub fn required_level_for(action: InstanceAction, touches_grants_permission: bool) -> DataPermission {
    if touches_grants_permission {
        DataPermission::DataPermissions
    } else {
        action.required_level()
    }
}
