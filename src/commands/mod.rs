pub mod general;
pub mod settings;
pub mod verification;

pub use general::{help, ping};
pub use settings::{
    check_rate_limit, disable_rate_limit, enable_rate_limit, set_member_audit_channel,
    set_rate_limit, set_unverified_role, set_verification_channel,
};
pub use verification::pending_verifications;

use crate::{Data, Error};

/// Every slash command the bot registers
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        ping(),
        help(),
        set_verification_channel(),
        set_member_audit_channel(),
        set_unverified_role(),
        enable_rate_limit(),
        disable_rate_limit(),
        set_rate_limit(),
        check_rate_limit(),
        pending_verifications(),
    ]
}
