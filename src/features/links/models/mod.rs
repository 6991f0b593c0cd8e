mod link_grant;

pub use link_grant::{
    sort_newest_first, GrantRecord, GrantState, GrantStatus, IssuedGrant, NewGrant,
};
