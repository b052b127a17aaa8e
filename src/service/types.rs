//! Request and response records of the organization RPCs.
//!
//! Field names follow the gateway's JSON (`departmentID`, `faceURL`, ...);
//! timestamps are Unix milliseconds.

use serde::{Deserialize, Serialize};

use crate::client::{Pagination, UserFullInfo};
use crate::entity::{department, department_member, organization};

/// Order given to the organization when it stands in for the tree root
pub const ORGANIZATION_ORDER: i32 = i32::MIN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(rename = "departmentID")]
    pub department_id: String,
    #[serde(rename = "faceURL")]
    pub face_url: String,
    pub name: String,
    #[serde(rename = "parentDepartmentID")]
    pub parent_department_id: String,
    pub order: i32,
    #[serde(rename = "createTime")]
    pub create_time: i64,
}

impl From<department::Model> for Department {
    fn from(m: department::Model) -> Self {
        Self {
            department_id: m.department_id,
            face_url: m.face_url,
            name: m.name,
            parent_department_id: m.parent_department_id,
            order: m.order,
            create_time: m.create_time.timestamp_millis(),
        }
    }
}

impl From<&organization::Model> for Department {
    fn from(org: &organization::Model) -> Self {
        Self {
            department_id: String::new(),
            face_url: org.logo_url.clone(),
            name: org.name.clone(),
            parent_department_id: String::new(),
            order: ORGANIZATION_ORDER,
            create_time: org.create_time.timestamp_millis(),
        }
    }
}

/// A department together with its descendant-inclusive member count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentNum {
    #[serde(flatten)]
    pub department: Department,
    #[serde(rename = "memberNum")]
    pub member_num: u32,
}

impl DepartmentNum {
    pub fn new(department: impl Into<Department>, member_num: u64) -> Self {
        Self {
            department: department.into(),
            member_num: u32::try_from(member_num).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentMember {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "departmentID")]
    pub department_id: String,
    pub position: String,
    pub station: String,
    pub order: i32,
    #[serde(rename = "entryTime")]
    pub entry_time: i64,
    /// 0 when the member has no termination time
    #[serde(rename = "terminationTime")]
    pub termination_time: i64,
    #[serde(rename = "createTime")]
    pub create_time: i64,
}

impl From<department_member::Model> for DepartmentMember {
    fn from(m: department_member::Model) -> Self {
        Self {
            user_id: m.user_id,
            department_id: m.department_id,
            position: m.position,
            station: m.station,
            order: m.order,
            entry_time: m.entry_time.timestamp_millis(),
            termination_time: m.termination_time.map(|t| t.timestamp_millis()).unwrap_or(0),
            create_time: m.create_time.timestamp_millis(),
        }
    }
}

/// A membership row joined with its department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDepartment {
    #[serde(flatten)]
    pub member: DepartmentMember,
    pub department: Option<DepartmentNum>,
}

/// A direct member of a department, with profile and block state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUserInfo {
    pub member: DepartmentMember,
    pub user: UserFullInfo,
    pub disabled: bool,
}

/// Node of the full department tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInfo {
    pub department: DepartmentNum,
    pub subdepartments: Vec<DepartmentInfo>,
}

/// A user with every department they belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentMemberUser {
    pub user: UserFullInfo,
    pub members: Vec<MemberDepartment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationInfo {
    #[serde(rename = "logoURL")]
    pub logo_url: String,
    pub name: String,
    pub homepage: String,
    pub introduction: String,
    #[serde(rename = "createTime")]
    pub create_time: i64,
}

impl From<organization::Model> for OrganizationInfo {
    fn from(m: organization::Model) -> Self {
        Self {
            logo_url: m.logo_url,
            name: m.name,
            homepage: m.homepage,
            introduction: m.introduction,
            create_time: m.create_time.timestamp_millis(),
        }
    }
}

// ---- requests ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateDepartmentReq {
    #[serde(rename = "departmentID")]
    pub department_id: String,
    pub name: String,
    #[serde(rename = "faceURL")]
    pub face_url: String,
    pub order: Option<i32>,
    #[serde(rename = "parentDepartmentID")]
    pub parent_department_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDepartmentReq {
    #[serde(rename = "departmentID")]
    pub department_id: String,
    pub name: Option<String>,
    #[serde(rename = "faceURL")]
    pub face_url: Option<String>,
    #[serde(rename = "parentDepartmentID")]
    pub parent_department_id: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DepartmentIdsReq {
    #[serde(rename = "departmentIDs")]
    pub department_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DepartmentIdReq {
    #[serde(rename = "departmentID")]
    pub department_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetDepartmentByNameReq {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SortDepartmentListReq {
    #[serde(rename = "departmentID")]
    pub department_id: String,
    #[serde(rename = "nextDepartmentID")]
    pub next_department_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateDepartmentMemberReq {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "departmentID")]
    pub department_id: String,
    pub position: String,
    pub station: String,
    pub order: Option<i32>,
    #[serde(rename = "entryTime")]
    pub entry_time: i64,
    #[serde(rename = "terminationTime")]
    pub termination_time: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserInDepartmentReq {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "departmentID")]
    pub department_id: String,
    pub position: Option<String>,
    pub station: Option<String>,
    pub order: Option<i32>,
    #[serde(rename = "entryTime")]
    pub entry_time: Option<i64>,
    /// `Some(0)` clears the termination time
    #[serde(rename = "terminationTime")]
    pub termination_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserDepartmentReq {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "departmentID")]
    pub department_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoveUserDepartment {
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Destination department
    #[serde(rename = "departmentID")]
    pub department_id: String,
    #[serde(rename = "currentDepartmentID")]
    pub current_department_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoveUserDepartmentReq {
    pub moves: Vec<MoveUserDepartment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SortOrganizationUserListReq {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "departmentID")]
    pub department_id: String,
    #[serde(rename = "nextUserID")]
    pub next_user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetOrganizationReq {
    #[serde(rename = "logoURL")]
    pub logo_url: Option<String>,
    pub name: Option<String>,
    pub homepage: Option<String>,
    pub introduction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserIdReq {
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserIdsReq {
    #[serde(rename = "userIDs")]
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetSearchDepartmentUserReq {
    pub keyword: String,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportDepartmentRow {
    /// Explicit ID for the last path segment when it has to be created
    #[serde(rename = "departmentID")]
    pub department_id: String,
    /// Slash-delimited path from the root, e.g. "Dev/Backend/Go"
    pub path: String,
    #[serde(rename = "faceURL")]
    pub face_url: String,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportDepartmentsReq {
    pub departments: Vec<ImportDepartmentRow>,
}

// ---- responses ----

#[derive(Debug, Clone, Serialize)]
pub struct CreateDepartmentResp {
    #[serde(rename = "departmentID")]
    pub department_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentsResp {
    pub departments: Vec<Department>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationDepartmentResp {
    pub departments: Vec<DepartmentInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubDepartmentResp {
    pub departments: Vec<DepartmentNum>,
    pub members: Vec<MemberUserInfo>,
    pub parents: Vec<DepartmentNum>,
    pub current: DepartmentNum,
}

#[derive(Debug, Clone, Serialize)]
pub struct SortResp {
    pub order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UngroupedResp {
    pub ungrouped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInDepartmentResp {
    pub users: Vec<DepartmentMemberUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchDepartmentUserResp {
    pub total: u32,
    pub users: Vec<DepartmentMemberUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDepartmentsResp {
    pub created: u32,
}
