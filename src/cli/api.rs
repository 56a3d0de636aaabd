use clap::Parser;

use crate::api::{ENTSOE_DEFAULT_API_URL, Entsoe};

#[derive(Parser)]
pub struct ApiArgs {
    /// ENTSO-E Transparency Platform security token.
    #[clap(long = "api-key", env = "ENTSOE_API_KEY", hide_env_values = true)]
    api_key: String,

    #[clap(long = "api-url", env = "ENTSOE_API_URL", default_value = ENTSOE_DEFAULT_API_URL)]
    api_url: String,

    /// Timeout of a single request, for example: `30s`. Requests never time out by default.
    #[clap(long, env = "ENTSOE_REQUEST_TIMEOUT")]
    request_timeout: Option<humantime::Duration>,
}

impl ApiArgs {
    pub fn new_client(&self, psr_type: Option<String>) -> Entsoe {
        Entsoe::new(&self.api_url, &self.api_key, self.request_timeout.map(Into::into))
            .with_psr_type(psr_type)
    }
}
