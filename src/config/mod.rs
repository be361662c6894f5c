//! Configuration module

mod site;

pub use site::ExperienceEntry;
pub use site::ProfileConfig;
pub use site::Recommendation;
pub use site::SiteConfig;
pub use site::SocialLink;
