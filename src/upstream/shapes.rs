//! Wire types for upstream response bodies
//!
//! The provider has shipped several response layouts over its API versions:
//! payloads may be wrapped in a `result` object, follow entries may nest the
//! account under `user` or inline it, and avatars appear as either `pfp_url`
//! or `pfp.url`. The types here deserialize every known layout, and the
//! functions below fold them into the internal types. Entries without a
//! numeric `fid` are dropped.

use super::FollowPage;
use crate::graph::{Fid, Profile};
use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

/// Body optionally wrapped in the legacy `result` envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { result: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { result } => result,
            Envelope::Bare(body) => body,
        }
    }
}

/// List body shared by follow listings and bulk lookups
#[derive(Debug, Deserialize)]
pub struct UsersBody {
    #[serde(default)]
    users: Vec<UserEntry>,
    #[serde(default)]
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct NextCursor {
    #[serde(default)]
    cursor: Option<String>,
}

/// One list entry, with the account nested, inline, or unreadable
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserEntry {
    Nested { user: WireUser },
    Inline(WireUser),
    Unrecognized(IgnoredAny),
}

impl UserEntry {
    fn into_user(self) -> Option<WireUser> {
        match self {
            UserEntry::Nested { user } | UserEntry::Inline(user) => Some(user),
            UserEntry::Unrecognized(_) => None,
        }
    }
}

/// Account as the provider describes it
#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(default, deserialize_with = "lenient_fid")]
    fid: Option<Fid>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, alias = "displayName")]
    display_name: Option<String>,
    #[serde(default, alias = "avatar_url")]
    pfp_url: Option<String>,
    #[serde(default)]
    pfp: Option<Pfp>,
}

#[derive(Debug, Deserialize)]
struct Pfp {
    #[serde(default)]
    url: Option<String>,
}

/// Username lookup body
#[derive(Debug, Deserialize)]
pub struct UserBody {
    #[serde(default)]
    user: Option<WireUser>,
}

pub type UsersResponse = Envelope<UsersBody>;
pub type UserResponse = Envelope<UserBody>;

/// Accept a JSON number or numeric string; anything else reads as absent
fn lenient_fid<'de, D>(deserializer: D) -> std::result::Result<Option<Fid>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFid {
        Number(u64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match RawFid::deserialize(deserializer)? {
        RawFid::Number(n) => Some(Fid::new(n)),
        RawFid::Text(s) => s.trim().parse().ok(),
        RawFid::Other(_) => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl WireUser {
    fn into_profile(self) -> Option<Profile> {
        let fid = self.fid?;
        let avatar_url =
            non_empty(self.pfp_url).or_else(|| non_empty(self.pfp.and_then(|pfp| pfp.url)));
        Some(Profile {
            fid,
            username: non_empty(self.username),
            display_name: non_empty(self.display_name),
            avatar_url,
        })
    }
}

/// Normalize a followers/following page
pub fn follow_page(body: UsersResponse) -> FollowPage {
    let body = body.into_inner();
    let fids = body
        .users
        .into_iter()
        .filter_map(UserEntry::into_user)
        .filter_map(|user| user.fid)
        .collect();

    let next_cursor = body
        .next
        .and_then(|next| next.cursor)
        .filter(|cursor| !cursor.is_empty());

    FollowPage { fids, next_cursor }
}

/// Normalize a bulk user lookup into profiles
pub fn profiles(body: UsersResponse) -> Vec<Profile> {
    body.into_inner()
        .users
        .into_iter()
        .filter_map(UserEntry::into_user)
        .filter_map(WireUser::into_profile)
        .collect()
}

/// Normalize a username lookup into the account's identifier
pub fn username_fid(body: UserResponse) -> Option<Fid> {
    body.into_inner().user.and_then(|user| user.fid)
}
