mod config;
mod error;
mod intent;
mod models;
mod state;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};
use crate::config::Config;
use crate::intent::{dispatch, CourseChanges, Intent};
use crate::models::NewCourse;
use crate::state::AppState;
use crate::utils::meeting_time::{build_meeting_time, MeetingSlot};
use crate::utils::preferences::Preferences;
use crate::utils::search::CourseFilter;

#[derive(Parser)]
#[command(name = "coursereg")]
#[command(
    about = "Course registration client: browse courses, build a weekly schedule, manage the catalogue",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in; the password falls back to COURSEREG_PASSWORD
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Search the course catalogue
    Courses(SearchArgs),
    /// Render the weekly calendar
    Schedule,
    /// Add a course to the schedule
    Add { course_id: u32 },
    /// Drop a course from the schedule
    Drop { course_id: u32 },
    /// Edit the notes or slot of a scheduled course
    Note {
        course_id: u32,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        slot: Option<String>,
    },
    /// Show or set scheduling preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// Course and account administration
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long, default_value = "")]
    dept: String,
    #[arg(long, default_value = "")]
    instructor: String,
    #[arg(long, default_value = "")]
    desc: String,
    #[arg(long, default_value = "")]
    number: String,
}

#[derive(Subcommand)]
enum PrefsCommand {
    Show,
    Set {
        /// Preferred course id, repeatable
        #[arg(long = "course")]
        courses: Vec<u32>,
        #[arg(long)]
        max_credits: Option<u32>,
        /// Times you can't attend, e.g. "F 08:00-21:00, M 09:00-10:00"
        #[arg(long, default_value = "")]
        unavailable: String,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    AddCourse {
        #[arg(long, default_value = "CS")]
        dept: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        /// One meeting, e.g. "MWF 9:00-9:50"; repeatable
        #[arg(long = "slot", required = true)]
        slots: Vec<MeetingSlot>,
    },
    UpdateCourse {
        id: u32,
        #[arg(long)]
        dept: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Replaces every meeting when given; repeatable
        #[arg(long = "slot")]
        slots: Vec<MeetingSlot>,
    },
    DeleteCourse { id: u32 },
    Users,
    AddUser {
        username: String,
        #[arg(long)]
        password: String,
    },
    DeleteUser { username: String },
}

impl Command {
    fn into_intent(self) -> Result<Intent> {
        let intent = match self {
            Command::Login { username, password } => {
                let password = match password {
                    Some(p) => p,
                    None => std::env::var("COURSEREG_PASSWORD").context(
                        "No --password given and COURSEREG_PASSWORD environment variable not found",
                    )?,
                };
                Intent::Login { username, password }
            }
            Command::Logout => Intent::Logout,
            Command::Courses(args) => Intent::ListCourses(CourseFilter::new(
                &args.dept,
                &args.instructor,
                &args.desc,
                &args.number,
            )),
            Command::Schedule => Intent::ShowSchedule,
            Command::Add { course_id } => Intent::AddToSchedule(course_id),
            Command::Drop { course_id } => Intent::DropFromSchedule(course_id),
            Command::Note { course_id, notes, slot } => {
                Intent::EditScheduleEntry { course_id, notes, slot }
            }
            Command::Prefs(PrefsCommand::Show) => Intent::ShowPreferences,
            Command::Prefs(PrefsCommand::Set { courses, max_credits, unavailable }) => {
                Intent::SavePreferences(Preferences::new(courses, max_credits, &unavailable))
            }
            Command::Admin(admin) => match admin {
                AdminCommand::AddCourse {
                    dept,
                    number,
                    instructor,
                    description,
                    location,
                    slots,
                } => Intent::AddCourse(NewCourse {
                    dept_code: dept,
                    course_number: number,
                    instructor,
                    description,
                    location,
                    meeting_time: build_meeting_time(&slots),
                }),
                AdminCommand::UpdateCourse {
                    id,
                    dept,
                    number,
                    instructor,
                    description,
                    location,
                    slots,
                } => {
                    let meeting_time = (!slots.is_empty()).then(|| build_meeting_time(&slots));
                    Intent::UpdateCourse {
                        id,
                        changes: CourseChanges {
                            dept_code: dept,
                            course_number: number,
                            instructor,
                            description,
                            location,
                            meeting_time,
                        },
                    }
                }
                AdminCommand::DeleteCourse { id } => Intent::DeleteCourse(id),
                AdminCommand::Users => Intent::ListUsers,
                AdminCommand::AddUser { username, password } => {
                    Intent::AddUser { username, password }
                }
                AdminCommand::DeleteUser { username } => Intent::DeleteUser(username),
            },
        };
        Ok(intent)
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let intent = cli.command.into_intent()?;
    let mut state = AppState::new(config)?;

    let outcome = dispatch(&mut state, intent).await?;
    print!("{}", outcome.to_text());
    Ok(())
}

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = TermLogger::init(
        config.log_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Logger unavailable: {}", e);
    }
    info!("Using backend at {}", config.api_url);

    // Every failure ends here: logged, shown once, no retry.
    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
