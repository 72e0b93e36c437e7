pub mod mailer;
pub use mailer::{HttpMailer, LogMailer, MailError, Mailer, OutgoingMail, build_mailer};

pub mod password;
pub use password::Passwords;

pub mod identity_service;
pub mod identity_service_impl;
pub use identity_service::{
    AuthenticatedUser, IdentityError, IdentityService, MailDelivery, Registered, Registration,
    Verification,
};
pub use identity_service_impl::SeaOrmIdentityService;

pub mod voting_service;
pub mod voting_service_impl;
pub use voting_service::{VoteError, VoteReceipt, VotingService};
pub use voting_service_impl::SeaOrmVotingService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{
    AdminError, AdminService, AuthenticatedAdmin, BootstrapAdmin, ContestantSummary, Dashboard,
    UserSummary,
};
pub use admin_service_impl::SeaOrmAdminService;
