//! electionday - terminal front end for the voting core
//!
//! Login & vote, view password-gated results, or seed the database.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use electionday::config::Config;
use electionday::results::{ResultsGate, WinnerSummary};
use electionday::seed::SeedData;
use electionday::{Election, Error, PartyLedger, Result};

const LOGIN_AND_VOTE: &str = "1";
const VIEW_RESULTS: &str = "2";
const QUIT: &str = "3";
const MENU: [(&str, &str); 3] = [
    (LOGIN_AND_VOTE, "Login & Vote"),
    (VIEW_RESULTS, "View Results"),
    (QUIT, "Quit"),
];
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Voting system prototype
///
/// Login to vote on a party and view current results. To vote you must be a
/// registered voter and enter your name and voter ID.
#[derive(Parser, Debug)]
#[command(name = "electionday")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Menu option to select on the first iteration (1, 2 or 3)
    #[arg(short, long)]
    option: Option<String>,

    /// Name of voter, used for the first login
    #[arg(short, long)]
    name: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables and load seed data
    Setup {
        /// Seed file (defaults to ELECTIONDAY_DATA_PATH)
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    electionday::init_with(&config.logging)?;

    let election = Election::open(&config.database)?;

    let outcome = match cli.command {
        Some(Command::Setup { data }) => setup(&election, data.unwrap_or(config.data_path)),
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            let mut terminal = Terminal {
                input: stdin.lock(),
                output: io::stdout(),
                interactive,
            };
            let gate = ResultsGate::new(config.results_password);
            run_menu(&election, &gate, &mut terminal, cli.option, cli.name)
        }
    };

    election.close()?;
    outcome
}

fn setup(election: &Election, data_path: PathBuf) -> Result<()> {
    let report = SeedData::from_path(&data_path)?.apply(election.store())?;

    println!(
        "Successfully created and populated database tables ({} voters, {} parties added).",
        report.voters_inserted, report.parties_inserted
    );
    Ok(())
}

/// Line-oriented screen I/O
///
/// When `interactive`, each screen starts on a cleared terminal and secrets
/// are read without echo.
struct Terminal<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "  {text}")?;
        Ok(())
    }

    fn header(&mut self, text: &str) -> Result<()> {
        if self.interactive {
            write!(self.output, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.output)?;
        self.say(text)?;
        writeln!(self.output)?;
        Ok(())
    }

    /// `None` once input is exhausted
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "  {text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like `prompt`, but typed characters are not shown on a terminal
    fn secret_prompt(&mut self, text: &str) -> Result<Option<String>> {
        if !self.interactive {
            return self.prompt(text);
        }

        write!(self.output, "  {text}")?;
        self.output.flush()?;
        match rpassword::read_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn confirm(&mut self, text: &str) -> Result<bool> {
        Ok(self
            .prompt(text)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    fn go_back(&mut self) -> Result<()> {
        self.prompt("Back to main menu > ")?;
        Ok(())
    }
}

enum Flow {
    Continue,
    Message(String),
    Exit,
}

fn run_menu<R: BufRead, W: Write>(
    election: &Election,
    gate: &ResultsGate,
    terminal: &mut Terminal<R, W>,
    mut option: Option<String>,
    mut name: Option<String>,
) -> Result<()> {
    let mut error_msg: Option<String> = None;

    loop {
        terminal.header("MAIN MENU")?;
        for (selector, label) in MENU {
            terminal.say(&format!("{selector}.  {label}"))?;
        }
        writeln!(terminal.output)?;

        if let Some(message) = error_msg.take() {
            terminal.say(&message)?;
            writeln!(terminal.output)?;
        }

        let selected = match option.take() {
            Some(selected) => selected,
            None => match terminal.prompt("Select menu option: ")? {
                Some(selected) => selected,
                None => break,
            },
        };

        let flow = match selected.trim() {
            LOGIN_AND_VOTE => login_and_vote(election, terminal, name.take())?,
            VIEW_RESULTS => view_results(election, gate, terminal)?,
            QUIT => Flow::Exit,
            other => Flow::Message(format!("Invalid selector ({other}), please try again.")),
        };

        match flow {
            Flow::Continue => {}
            Flow::Message(message) => error_msg = Some(message),
            Flow::Exit => break,
        }
    }

    terminal.header("Goodbye")?;
    Ok(())
}

fn login_and_vote<R: BufRead, W: Write>(
    election: &Election,
    terminal: &mut Terminal<R, W>,
    preset_name: Option<String>,
) -> Result<Flow> {
    let name = match preset_name {
        Some(name) => name,
        None => match terminal.prompt("Name: ")? {
            Some(name) => name,
            None => return Ok(Flow::Exit),
        },
    };
    let Some(voter_id) = terminal.secret_prompt("Voter ID: ")? else {
        return Ok(Flow::Exit);
    };

    let mut voter = match election.registry.login(&name, &voter_id) {
        Ok(voter) => voter,
        Err(e) if e.is_user_correctable() => return Ok(Flow::Message("Invalid credentials.".to_string())),
        Err(e) => return Err(e),
    };
    if voter.has_voted {
        return Ok(Flow::Message("You have already voted.".to_string()));
    }

    let parties = election.ledger.list_all()?;
    terminal.header("CAST VOTE")?;
    for party in &parties {
        terminal.say(&format!("{}  {}", party.selector, party.name))?;
    }
    writeln!(terminal.output)?;

    let mut party = loop {
        terminal.say("Select a party to cast your vote.")?;
        terminal.say("Enter C to cancel.")?;
        let Some(selector) = terminal.prompt("")? else {
            return Ok(Flow::Exit);
        };
        let selector = selector.to_lowercase();

        if selector == "c" && terminal.confirm("Return to menu? Y/n ")? {
            return Ok(Flow::Continue);
        }

        let Some(selected) = PartyLedger::find_by_selector(&parties, &selector) else {
            terminal.say("Invalid selection.")?;
            continue;
        };

        terminal.say(&format!("You have selected: {}", selected.name.to_uppercase()))?;
        if terminal.confirm("Confirm vote? Y/n ")? {
            break selected.clone();
        }
    };

    match election.ballot_box.cast_vote(&mut voter, &mut party) {
        Ok(_) => {}
        Err(Error::AlreadyVoted { .. }) => {
            return Ok(Flow::Message("You have already voted.".to_string()));
        }
        Err(e) => return Err(e),
    }

    terminal.say("Thank you for voting!")?;
    terminal.go_back()?;
    Ok(Flow::Continue)
}

fn view_results<R: BufRead, W: Write>(
    election: &Election,
    gate: &ResultsGate,
    terminal: &mut Terminal<R, W>,
) -> Result<Flow> {
    let Some(password) = terminal.secret_prompt("Enter password to view results: ")? else {
        return Ok(Flow::Exit);
    };
    if !gate.verify(&password) {
        return Ok(Flow::Message("Invalid password.".to_string()));
    }

    terminal.header("CURRENT RESULTS")?;
    for party in election.ledger.list_by_results()? {
        terminal.say(&format!("Votes: {}  {}", party.votes, party.name))?;
    }
    writeln!(terminal.output)?;

    let summary = WinnerSummary::from_winners(&election.ledger.winners()?);
    terminal.say(&summary.to_string())?;
    writeln!(terminal.output)?;

    terminal.go_back()?;
    Ok(Flow::Continue)
}
