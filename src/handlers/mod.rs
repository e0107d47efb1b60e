// Two tiers: public (token acquisition) and protected (access token required)
pub mod public;
pub mod protected;
