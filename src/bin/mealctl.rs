use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use meal_planner::client::render::{render_table, rows};
use meal_planner::client::{HttpMealsApi, MealController, ReloadTrigger, RELOAD_INTERVAL};
use meal_planner::models::Meal;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mealctl")]
#[command(about = "Terminal client for the meal planner")]
struct Cli {
    /// Base URL of the meal planner server
    #[arg(long, env = "MEAL_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the coming week
    Show,
    /// Advance one meal to its next status
    Cycle { date: NaiveDate, meal: Meal },
    /// Set the breakfast time for a day whose breakfast is yes
    SetTime { date: NaiveDate, time: String },
    /// Keep the week on screen, reloading every five minutes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    let mut controller = MealController::new(HttpMealsApi::new(cli.server));
    controller.load().await?;

    match cli.command {
        Command::Show => {}
        Command::Cycle { date, meal } => {
            let status = controller.cycle(date, meal).await?;
            println!("{date} {meal}: {status}");
        }
        Command::SetTime { date, time } => {
            controller.set_breakfast_time(date, &time).await?;
        }
        Command::Watch => return watch(controller).await,
    }

    print!("{}", render_table(&rows(controller.days(), today())));
    Ok(())
}

async fn watch(
    mut controller: MealController<HttpMealsApi>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(RELOAD_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = controller.reload(ReloadTrigger::Interval).await {
                    warn!("showing last loaded week: {err}");
                }
                print!("{}", render_table(&rows(controller.days(), today())));
                if let Some(status) = controller.status() {
                    println!("{}", status.text);
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                return Ok(());
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
