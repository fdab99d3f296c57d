use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    let mut cmd = Command::new("ads-connect")
        .about("Google Ads OAuth bridge and webhook subscriber")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("client_id")
                .long("client-id")
                .global(true)
                .value_name("ID")
                .help("OAuth client id (env: GOOGLE_CLIENT_ID)"),
        )
        .arg(
            Arg::new("client_secret")
                .long("client-secret")
                .global(true)
                .value_name("SECRET")
                .help("OAuth client secret (env: GOOGLE_CLIENT_SECRET)"),
        )
        .arg(
            Arg::new("redirect_uri")
                .long("redirect-uri")
                .global(true)
                .value_name("URI")
                .help("OAuth redirect URI (env: GOOGLE_REDIRECT_URI)"),
        )
        .arg(
            Arg::new("developer_token")
                .long("developer-token")
                .global(true)
                .value_name("TOKEN")
                .help("Developer token (env: GOOGLE_ADS_DEVELOPER_TOKEN)"),
        )
        .arg(
            Arg::new("token_url")
                .long("token-url")
                .global(true)
                .value_name("URL")
                .help("OAuth token endpoint (env: GOOGLE_TOKEN_URL)"),
        )
        .arg(
            Arg::new("auth_url")
                .long("auth-url")
                .global(true)
                .value_name("URL")
                .help("OAuth consent endpoint (env: GOOGLE_AUTH_URL)"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .global(true)
                .value_name("URL")
                .help("Ads API endpoint (env: GOOGLE_ADS_ENDPOINT)"),
        )
        .arg(
            Arg::new("api_version")
                .long("api-version")
                .global(true)
                .value_name("VERSION")
                .help("Ads API version (env: GOOGLE_ADS_API_VERSION)"),
        )
        .arg(
            Arg::new("webhook_url")
                .long("webhook-url")
                .global(true)
                .value_name("URL")
                .help("Webhook URL registered with the Ads API (env: GOOGLE_ADS_WEBHOOK_URL)"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .global(true)
                .value_name("ADDR")
                .help("Listen address (env: BIND_ADDR)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Upstream request timeout in seconds"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        );

    cmd = cmd.subcommand(Command::new("serve").about("Run the HTTP service"));

    cmd = cmd.subcommand(
        Command::new("auth-url")
            .about("Print the Google consent URL")
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Emit machine-readable JSON"),
            ),
    );

    cmd
}
