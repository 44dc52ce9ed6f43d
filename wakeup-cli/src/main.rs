mod store;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

use store::JsonFileStore;
use wakeup_game::{
    BoardingPass, ClockTime, EconomyConfig, FixedClock, FlightDesk, FlightLog, Location,
    SystemClock, Ticket, TicketOptions, TimeSource, WakeEvent, make_geo_ticket,
    normalize_clock_text,
};

#[derive(Debug, Parser)]
#[command(name = "wakeup-cli", version)]
#[command(about = "Wake Up Airlines flight desk: turn wake-up times into tickets and fuel")]
struct Cli {
    /// JSON file holding fuel, last wake event and ticket history
    #[arg(long, global = true, default_value = "wakeup-state.json")]
    state: PathBuf,

    /// Economy config (JSON); defaults to the time-delta tank
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the destination-game economy (geo engine, 1000-fuel tank)
    #[arg(long, global = true, conflicts_with = "config")]
    legacy: bool,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Print JSON instead of the console view
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a one-off time-delta ticket without touching the state file
    Ticket {
        /// Previous wake time (HHMM, HH:MM or 7:30am); omit for a first flight
        #[arg(long)]
        prev: Option<String>,
        /// Current wake time
        #[arg(long)]
        curr: String,
        #[command(flatten)]
        flags: TicketFlags,
    },
    /// Price a one-off geo ticket between two "City,Country,lat,lon" places
    Geo {
        /// Departure; omit to leave from the home base
        #[arg(long, value_parser = parse_location)]
        from: Option<Location>,
        #[arg(long, value_parser = parse_location)]
        to: Location,
        #[command(flatten)]
        flags: TicketFlags,
    },
    /// Register this morning's wake-up and charge the tank
    Fly {
        /// Wake time; defaults to the current clock time
        #[arg(long, conflicts_with = "place")]
        at: Option<String>,
        /// Wake location for the geo engine ("City,Country,lat,lon")
        #[arg(long, value_parser = parse_location)]
        place: Option<Location>,
        #[command(flatten)]
        flags: TicketFlags,
    },
    /// Show fuel, the last event and recent tickets
    Status {
        /// How many history entries to list
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },
    /// Add fuel, up to the tank capacity
    Refuel { amount: u32 },
    /// Set the fuel level, clamped to the tank capacity
    SetFuel { value: u32 },
    /// Forget today's charge, or everything with --all
    Reset {
        #[arg(long)]
        all: bool,
    },
    /// Print decorative flight, seat and gate numbers
    BoardingPass {
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, Args)]
struct TicketFlags {
    /// x1.2 fuel when waking in the night window
    #[arg(long)]
    night_penalty: bool,
    /// x0.9 fuel for a consistent streak
    #[arg(long)]
    streak_bonus: bool,
    /// First flight is a free registration
    #[arg(long)]
    first_day_free: bool,
}

impl From<TicketFlags> for TicketOptions {
    fn from(flags: TicketFlags) -> Self {
        Self::default()
            .with_night_penalty(flags.night_penalty)
            .with_streak_bonus(flags.streak_bonus)
            .with_first_day_free(flags.first_day_free)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let clock = time_source(cli.date);

    match &cli.command {
        Command::Ticket { prev, curr, flags } => {
            let prev = prev
                .as_deref()
                .map(normalize_clock_text)
                .transpose()
                .context("invalid --prev")?;
            let curr = normalize_clock_text(curr).context("invalid --curr")?;
            let ticket = load_config(&cli)?
                .time_engine()
                .issue(prev, curr, (*flags).into());
            print_ticket(&Ticket::TimeDelta(ticket), cli.json)
        }
        Command::Geo { from, to, flags } => {
            let ticket = make_geo_ticket(from.as_ref(), Some(to), (*flags).into())?;
            print_ticket(&Ticket::Geo(ticket), cli.json)
        }
        Command::Fly { at, place, flags } => {
            let now = clock.now();
            let event = match (at, place) {
                (_, Some(place)) => WakeEvent::Place(place.clone()),
                (Some(text), None) => {
                    WakeEvent::Clock(normalize_clock_text(text).context("invalid --at")?)
                }
                (None, None) => WakeEvent::Clock(ClockTime::from_timelike(&now)),
            };
            let mut desk = open_desk(&cli)?;
            let ticket = desk.fly(event, now.date(), (*flags).into())?;
            print_ticket(&ticket, cli.json)?;
            if !cli.json {
                let log = desk.log()?;
                println!("{}", fuel_gauge(&log));
            }
            Ok(())
        }
        Command::Status { recent } => {
            let desk = open_desk(&cli)?;
            let log = desk.log()?;
            print_status(&log, *recent, clock.now().date(), cli.json)
        }
        Command::Refuel { amount } => {
            let mut desk = open_desk(&cli)?;
            let level = desk.update(|log| log.credit(*amount))?;
            println!("Fuel: {level}");
            Ok(())
        }
        Command::SetFuel { value } => {
            let mut desk = open_desk(&cli)?;
            let level = desk.update(|log| {
                log.set_fuel(*value);
                log.fuel()
            })?;
            println!("Fuel: {level}");
            Ok(())
        }
        Command::Reset { all } => {
            let mut desk = open_desk(&cli)?;
            if *all {
                desk.update(FlightLog::reset_all)?;
                println!("{}", "Flight log cleared".yellow());
            } else {
                desk.update(FlightLog::reset_today)?;
                println!("{}", "Today's charge cleared".yellow());
            }
            Ok(())
        }
        Command::BoardingPass { seed } => {
            let mut rng = seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
            let pass = BoardingPass::draw(&mut rng);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pass)?);
            } else {
                println!("{}", pass.to_string().cyan());
            }
            Ok(())
        }
    }
}

fn time_source(date: Option<NaiveDate>) -> Box<dyn TimeSource> {
    match date {
        Some(date) => Box::new(FixedClock(date.and_time(SystemClock.now().time()))),
        None => Box::new(SystemClock),
    }
}

fn load_config(cli: &Cli) -> Result<EconomyConfig> {
    if cli.legacy {
        return Ok(EconomyConfig::legacy_game());
    }
    let Some(path) = &cli.config else {
        return Ok(EconomyConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EconomyConfig::from_json(&text).with_context(|| format!("loading config {}", path.display()))
}

fn open_desk(cli: &Cli) -> Result<FlightDesk<JsonFileStore>> {
    let config = load_config(cli)?;
    let store = open_store(&cli.state)?;
    Ok(FlightDesk::new(config, store))
}

fn open_store(path: &Path) -> Result<JsonFileStore> {
    debug!("using state file {}", path.display());
    JsonFileStore::open(path).with_context(|| format!("opening state {}", path.display()))
}

/// Parse `City,Country,lat,lon`.
fn parse_location(text: &str) -> Result<Location> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [city, country, lat, lon] = parts.as_slice() else {
        bail!("expected City,Country,lat,lon but got {text:?}");
    };
    let latitude: f64 = lat.parse().with_context(|| format!("bad latitude {lat:?}"))?;
    let longitude: f64 = lon.parse().with_context(|| format!("bad longitude {lon:?}"))?;
    let location = Location::new(city, country, latitude, longitude);
    if city.is_empty() || country.is_empty() || !location.has_valid_coordinates() {
        bail!("location out of range: {text:?}");
    }
    Ok(location)
}

fn print_ticket(ticket: &Ticket, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ticket)?);
        return Ok(());
    }
    let direction = ticket.direction();
    match ticket {
        Ticket::TimeDelta(t) => {
            println!(
                "{} {}",
                t.ticket_type.badge(),
                t.ticket_type.label().bright_blue().bold()
            );
            let prev = t.prev_time.map_or_else(|| "----".to_string(), ClockTime::with_colon);
            println!(
                "  {prev} {} {}  ({} min)",
                direction.symbol(),
                t.curr_time.with_colon(),
                t.delta_min
            );
        }
        Ticket::Geo(t) => {
            println!(
                "{} {}",
                t.ticket_type.badge(),
                t.ticket_type.label().bright_blue().bold()
            );
            println!(
                "  {}, {} {} {}, {}  (NT${})",
                t.from_city,
                t.from_country,
                direction.symbol(),
                t.to_city,
                t.to_country,
                t.money
            );
        }
    }
    println!(
        "  {} km {}  fuel {}",
        ticket.distance_km(),
        direction.as_str().dimmed(),
        ticket.fuel_used().to_string().yellow()
    );
    println!("  {}", ticket.narrative().italic());
    Ok(())
}

fn fuel_gauge(log: &FlightLog) -> String {
    let line = format!("Fuel: {}/{}", log.fuel(), log.capacity());
    if log.fuel() == 0 {
        line.red().bold().to_string()
    } else if log.fuel() * 4 < log.capacity() {
        line.yellow().to_string()
    } else {
        line.green().to_string()
    }
}

fn print_status(log: &FlightLog, recent: usize, today: NaiveDate, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::json!({
            "fuel": log.fuel(),
            "capacity": log.capacity(),
            "engine": log.config().engine.as_str(),
            "lastEvent": log.last_event(),
            "lastDate": log.last_processed_date(),
            "chargedToday": log.charged_on(today),
            "flights": log.history().len(),
            "currentTicket": log.current_ticket(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Wake Up Airlines".bright_blue().bold());
    println!("{}", fuel_gauge(log));
    println!("Engine: {}", log.config().engine.as_str());
    match log.last_event() {
        Some(WakeEvent::Clock(time)) => println!("Last wake-up: {}", time.with_colon()),
        Some(WakeEvent::Place(place)) => {
            println!("Last wake-up: {}, {}", place.city, place.country);
        }
        None => println!("Last wake-up: {}", "none yet".dimmed()),
    }
    if log.charged_on(today) {
        println!("{}", "Already charged today".dimmed());
    }
    println!("Flights: {}", log.history().len());
    for entry in log.history().iter().rev().take(recent) {
        let route = entry
            .route
            .as_ref()
            .map(|r| format!(" {} → {}", r.from_city, r.to_city))
            .unwrap_or_default();
        println!(
            "  {} {} {} km, fuel {}{route}",
            entry.date,
            entry.ticket.class_label(),
            entry.ticket.distance_km(),
            entry.ticket.fuel_used()
        );
    }
    Ok(())
}
