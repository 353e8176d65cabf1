use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use clap::{Arg, ArgAction, Command};
use log::{debug, warn};
use nbalerts::config::{
    API_ENDPOINT_VAR, API_KEY_VAR, API_SHAPE_VAR, ApiConfig, Config, DEFAULT_API_ENDPOINT,
    DEFAULT_TEAMS_URL, REGION_VAR, TABLE_NAME_VAR, TEAMS_URL_VAR, TOPIC_ARN_VAR,
};
use nbalerts::handler::{self, compose_message, process_games};
use nbalerts::publish::SnsPublisher;
use nbalerts::sportsdata::SportsApi;
use nbalerts::store::{DynamoStore, GameStore};
use nbalerts::teams::{publish_teams, team_digest};
use nbalerts::{install_crypto_provider, set_up_logger};

#[derive(Debug)]
struct Args {
    verbose: bool,
    use_cache: bool,
    teams: bool,
    publish: bool,
    date: NaiveDate,
    api: ApiConfig,
    topic_arn: Option<String>,
    table_name: Option<String>,
    region: Option<String>,
}

fn parse_args() -> Result<Args> {
    let matches = Command::new("nbalerts")
        .version("0.1")
        .author("Jacob Luszcz")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Verbose mode. Outputs DEBUG and higher log messages."),
        )
        .arg(
            Arg::new("use-cache")
                .short('c')
                .long("cache")
                .action(ArgAction::SetTrue)
                .help("Use cached values, if present, rather than querying remote services."),
        )
        .arg(
            Arg::new("teams")
                .long("teams")
                .action(ArgAction::SetTrue)
                .help("Report the league's team directory instead of today's games."),
        )
        .arg(
            Arg::new("publish")
                .short('p')
                .long("publish")
                .action(ArgAction::SetTrue)
                .help("Publish to the SNS topic rather than printing to stdout."),
        )
        .arg(
            Arg::new("date")
                .short('d')
                .long("date")
                .value_name("YYYY-MM-DD")
                .help("Report games for this date rather than today (UTC)."),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .env(API_KEY_VAR)
                .hide_env_values(true)
                .help("Sports data API key."),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .env(API_ENDPOINT_VAR)
                .default_value(DEFAULT_API_ENDPOINT)
                .help("Games-by-date endpoint; the date is appended as a path segment."),
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .env(API_SHAPE_VAR)
                .default_value("flat")
                .help("Response envelope: flat, league or data."),
        )
        .arg(
            Arg::new("teams-url")
                .long("teams-url")
                .env(TEAMS_URL_VAR)
                .default_value(DEFAULT_TEAMS_URL)
                .help("Team directory endpoint."),
        )
        .arg(
            Arg::new("topic-arn")
                .long("topic-arn")
                .env(TOPIC_ARN_VAR)
                .help("SNS topic to publish to."),
        )
        .arg(
            Arg::new("table")
                .long("table")
                .env(TABLE_NAME_VAR)
                .help("DynamoDB table to store games in."),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .env(REGION_VAR)
                .help("AWS region."),
        )
        .get_matches();

    let string_arg = |name: &str| matches.get_one::<String>(name).cloned();

    let date = match string_arg("date") {
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date {d:?}"))?,
        None => Utc::now().date_naive(),
    };

    let api = ApiConfig::new(
        string_arg("endpoint"),
        string_arg("api-key"),
        string_arg("shape"),
        string_arg("teams-url"),
    )?;

    Ok(Args {
        verbose: matches.get_flag("verbose"),
        use_cache: matches.get_flag("use-cache"),
        teams: matches.get_flag("teams"),
        publish: matches.get_flag("publish"),
        date,
        api,
        topic_arn: string_arg("topic-arn"),
        table_name: string_arg("table"),
        region: string_arg("region"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    set_up_logger(module_path!(), args.verbose)?;
    install_crypto_provider();
    debug!("{args:?}");

    let api = SportsApi::new(&args.api)?;

    if !args.publish {
        let output = if args.teams {
            team_digest(&nbalerts::teams(&api, args.use_cache).await?)
        } else {
            let games = nbalerts::games(&api, args.date, args.use_cache).await?;
            let (summaries, report) = process_games(&games, None).await;
            debug!("{report:?}");
            compose_message(&summaries)
        };
        println!("{output}");
        return Ok(());
    }

    let config = Config {
        topic_arn: args
            .topic_arn
            .ok_or_else(|| anyhow!("--topic-arn or {TOPIC_ARN_VAR} is required to publish"))?,
        api: args.api,
        table_name: args.table_name,
        region: args.region,
    };
    let sdk_config = config.aws_config().await;
    let publisher = SnsPublisher::new(&sdk_config, &config.topic_arn);

    let response = if args.teams {
        publish_teams(nbalerts::teams(&api, args.use_cache).await, &publisher).await
    } else {
        let store = config
            .table_name
            .as_ref()
            .map(|table| DynamoStore::new(&sdk_config, table));
        let games = nbalerts::games(&api, args.date, args.use_cache)
            .await
            .unwrap_or_else(|e| {
                warn!("Treating {} as having no games: {e:#}", args.date);
                Vec::new()
            });
        handler::notify(
            &games,
            &publisher,
            store.as_ref().map(|s| s as &dyn GameStore),
        )
        .await
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        return Err(anyhow!("Run failed with status {}", response.status_code));
    }

    Ok(())
}
