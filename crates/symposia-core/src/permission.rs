//! Permission and role vocabulary.
//!
//! Conference capabilities, platform feature flags, and the closed role
//! set are all compile-time enumerations rather than free-form strings,
//! so a mistyped permission is a compile error instead of a silent deny.
//! Wire strings (`verb:noun`) are what the store and any API surface see.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SymposiaError;

/// A fine-grained capability inside a single conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    CreateConference,
    UpdateConference,
    DeleteConference,
    ReadConference,
    AssignReviewer,
    ReadReviews,
    ReadAbstracts,
    UpdateAbstractStatus,
    CreateSchedule,
    UpdateSchedule,
    DeleteSchedule,
    ManageMembers,
    CreateReview,
    UpdateReview,
    CreateAbstract,
    UpdateAbstract,
    DeleteAbstract,
    ReadOwnAbstracts,
    ReadSchedule,
}

impl Permission {
    /// Wire representation, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateConference => "create:conference",
            Permission::UpdateConference => "update:conference",
            Permission::DeleteConference => "delete:conference",
            Permission::ReadConference => "read:conference",
            Permission::AssignReviewer => "assign:reviewer",
            Permission::ReadReviews => "read:reviews",
            Permission::ReadAbstracts => "read:abstracts",
            Permission::UpdateAbstractStatus => "update:abstract_status",
            Permission::CreateSchedule => "create:schedule",
            Permission::UpdateSchedule => "update:schedule",
            Permission::DeleteSchedule => "delete:schedule",
            Permission::ManageMembers => "manage:members",
            Permission::CreateReview => "create:review",
            Permission::UpdateReview => "update:review",
            Permission::CreateAbstract => "create:abstract",
            Permission::UpdateAbstract => "update:abstract",
            Permission::DeleteAbstract => "delete:abstract",
            Permission::ReadOwnAbstracts => "read:own_abstracts",
            Permission::ReadSchedule => "read:schedule",
        }
    }
}

impl FromStr for Permission {
    type Err = SymposiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create:conference" => Ok(Permission::CreateConference),
            "update:conference" => Ok(Permission::UpdateConference),
            "delete:conference" => Ok(Permission::DeleteConference),
            "read:conference" => Ok(Permission::ReadConference),
            "assign:reviewer" => Ok(Permission::AssignReviewer),
            "read:reviews" => Ok(Permission::ReadReviews),
            "read:abstracts" => Ok(Permission::ReadAbstracts),
            "update:abstract_status" => Ok(Permission::UpdateAbstractStatus),
            "create:schedule" => Ok(Permission::CreateSchedule),
            "update:schedule" => Ok(Permission::UpdateSchedule),
            "delete:schedule" => Ok(Permission::DeleteSchedule),
            "manage:members" => Ok(Permission::ManageMembers),
            "create:review" => Ok(Permission::CreateReview),
            "update:review" => Ok(Permission::UpdateReview),
            "create:abstract" => Ok(Permission::CreateAbstract),
            "update:abstract" => Ok(Permission::UpdateAbstract),
            "delete:abstract" => Ok(Permission::DeleteAbstract),
            "read:own_abstracts" => Ok(Permission::ReadOwnAbstracts),
            "read:schedule" => Ok(Permission::ReadSchedule),
            other => Err(SymposiaError::Validation {
                message: format!("unknown permission: {other}"),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The effective capability set of a user within one conference.
pub type PermissionSet = BTreeSet<Permission>;

/// A platform-level feature flag on a user account.
///
/// Features are coarse, global capabilities ("may create conferences at
/// all"); per-conference rights are [`Permission`]s granted through role
/// assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    ReadUser,
    UpdateUser,
    CreateConference,
    CreateAbstract,
    CreateReview,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ReadUser => "read:user",
            Feature::UpdateUser => "update:user",
            Feature::CreateConference => "create:conference",
            Feature::CreateAbstract => "create:abstract",
            Feature::CreateReview => "create:review",
        }
    }
}

impl FromStr for Feature {
    type Err = SymposiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read:user" => Ok(Feature::ReadUser),
            "update:user" => Ok(Feature::UpdateUser),
            "create:conference" => Ok(Feature::CreateConference),
            "create:abstract" => Ok(Feature::CreateAbstract),
            "create:review" => Ok(Feature::CreateReview),
            other => Err(SymposiaError::Validation {
                message: format!("unknown feature: {other}"),
            }),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Features granted to every newly registered account.
pub const DEFAULT_FEATURES: &[Feature] = &[
    Feature::ReadUser,
    Feature::UpdateUser,
    Feature::CreateConference,
    Feature::CreateAbstract,
    Feature::CreateReview,
];

/// The closed set of roles a user can hold in a conference.
///
/// A user may hold several distinct roles in the same conference; each
/// assignment contributes its own permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConferenceRole {
    Organizer,
    Reviewer,
    Author,
    Attendee,
}

impl ConferenceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConferenceRole::Organizer => "organizer",
            ConferenceRole::Reviewer => "reviewer",
            ConferenceRole::Author => "author",
            ConferenceRole::Attendee => "attendee",
        }
    }

    /// The immutable default permission template for this role.
    ///
    /// Assignments copy the template; a custom grant on one assignment
    /// can never mutate it.
    pub const fn template(&self) -> &'static [Permission] {
        match self {
            ConferenceRole::Organizer => &[
                Permission::CreateConference,
                Permission::UpdateConference,
                Permission::DeleteConference,
                Permission::ReadConference,
                Permission::AssignReviewer,
                Permission::ReadReviews,
                Permission::ReadAbstracts,
                Permission::UpdateAbstractStatus,
                Permission::CreateSchedule,
                Permission::UpdateSchedule,
                Permission::DeleteSchedule,
                Permission::ManageMembers,
            ],
            ConferenceRole::Reviewer => &[
                Permission::ReadConference,
                Permission::ReadAbstracts,
                Permission::CreateReview,
                Permission::UpdateReview,
                Permission::ReadReviews,
            ],
            ConferenceRole::Author => &[
                Permission::ReadConference,
                Permission::CreateAbstract,
                Permission::UpdateAbstract,
                Permission::DeleteAbstract,
                Permission::ReadOwnAbstracts,
            ],
            ConferenceRole::Attendee => &[Permission::ReadConference, Permission::ReadSchedule],
        }
    }

    /// The template as an owned set, ready to store on an assignment.
    pub fn template_set(&self) -> PermissionSet {
        self.template().iter().copied().collect()
    }
}

impl FromStr for ConferenceRole {
    type Err = SymposiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(ConferenceRole::Organizer),
            "reviewer" => Ok(ConferenceRole::Reviewer),
            "author" => Ok(ConferenceRole::Author),
            "attendee" => Ok(ConferenceRole::Attendee),
            other => Err(SymposiaError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}

impl fmt::Display for ConferenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConferenceRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConferenceRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
