//! Interactive menu session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::session::{SessionError, TravelSession};

/// The numbered travel-planning menu
pub struct ReplSession {
    session: TravelSession,
}

/// What the prompt helpers return when the user cancels with Ctrl-C/Ctrl-D
enum Answer {
    Text(String),
    Cancelled,
}

impl ReplSession {
    pub fn new(session: TravelSession) -> Self {
        Self { session }
    }

    /// Run the menu loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            self.print_menu();
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let choice = line.trim();
                    if choice.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(choice);

                    match choice {
                        "1" => self.plan_trip(&mut rl).await?,
                        "2" => self.recommend(&mut rl).await?,
                        "3" => self.tips(&mut rl).await?,
                        "4" => self.optimize(&mut rl).await?,
                        "5" => self.recall().await,
                        "6" => self.chat(&mut rl).await?,
                        "7" => self.weather(&mut rl).await?,
                        "8" => self.search(&mut rl)?,
                        "9" => self.stats(),
                        "0" | "q" | "quit" | "exit" => break,
                        _ => {
                            println!("{} Unknown option: {}", "?".yellow(), choice);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Safe travels!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "TravelAgent".bright_cyan().bold());
        println!("Plan trips, get recommendations, and check the weather.");
        println!("Pick a number, or {} to quit.", "0".yellow());
    }

    fn print_menu(&self) {
        println!();
        println!("{}", "What would you like to do?".bright_cyan());
        println!("  {} Plan a new trip", "1.".yellow());
        println!("  {} Recommend destinations", "2.".yellow());
        println!("  {} Travel tips", "3.".yellow());
        println!("  {} Optimize an itinerary", "4.".yellow());
        println!("  {} Recall travel history", "5.".yellow());
        println!("  {} Chat with an agent", "6.".yellow());
        println!("  {} Weather check & packing list", "7.".yellow());
        println!("  {} Search past trips", "8.".yellow());
        println!("  {} Database statistics", "9.".yellow());
        println!("  {} Quit", "0.".yellow());
    }

    async fn plan_trip(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(destination) = ask(rl, "Destination (e.g. Paris, France):")? else {
            return Ok(());
        };
        let Some(start) = ask(rl, "Start date (YYYY-MM-DD):")? else {
            return Ok(());
        };
        let Some(end) = ask(rl, "End date (YYYY-MM-DD):")? else {
            return Ok(());
        };
        let Some(preferences) = ask(rl, "Preferences (museums, food, hiking...):")? else {
            return Ok(());
        };
        let Some(budget) = ask(rl, "Budget (low/moderate/high):")? else {
            return Ok(());
        };

        render(self.session.plan_trip(&destination, &start, &end, &preferences, &budget).await);
        Ok(())
    }

    async fn recommend(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(preferences) = ask(rl, "What do you enjoy (beaches, culture, nightlife...)?")? else {
            return Ok(());
        };
        let Some(season) = ask(rl, "Travel season:")? else {
            return Ok(());
        };
        let Some(budget) = ask(rl, "Budget:")? else {
            return Ok(());
        };
        let Some(duration) = ask(rl, "Trip duration:")? else {
            return Ok(());
        };

        render(
            self.session
                .recommend_destinations(&preferences, &season, &budget, &duration)
                .await,
        );
        Ok(())
    }

    async fn tips(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(destination) = ask(rl, "Destination:")? else {
            return Ok(());
        };
        let Some(style) = ask(rl, "Travel style (backpacking, luxury, family...):")? else {
            return Ok(());
        };

        render(self.session.travel_tips(&destination, &style).await);
        Ok(())
    }

    async fn optimize(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(itinerary) = ask(rl, "Paste your current itinerary:")? else {
            return Ok(());
        };
        let Some(feedback) = ask(rl, "What should change?")? else {
            return Ok(());
        };

        render(self.session.optimize_itinerary(&itinerary, &feedback).await);
        Ok(())
    }

    async fn recall(&self) {
        render(self.session.recall_history().await);
    }

    async fn chat(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(role) = ask(rl, "Agent (itinerary/advisor/memory, blank for advisor):")? else {
            return Ok(());
        };
        let Some(message) = ask(rl, "Your message:")? else {
            return Ok(());
        };

        render(self.session.chat(&message, &role).await);
        Ok(())
    }

    async fn weather(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(city) = ask(rl, "City:")? else {
            return Ok(());
        };
        let Some(days) = ask(rl, "Forecast days (1-5):")? else {
            return Ok(());
        };
        let days = days.parse::<u32>().unwrap_or(3);

        render(self.session.weather_report(&city, days).await);

        let Some(duration) = ask(rl, "Trip length in days for a packing list (blank to skip):")? else {
            return Ok(());
        };
        if let Ok(duration) = duration.parse::<u32>() {
            render(self.session.packing_checklist(&city, duration).await);
        }
        Ok(())
    }

    fn search(&self, rl: &mut DefaultEditor) -> Result<()> {
        let Some(query) = ask(rl, "Destination to search for:")? else {
            return Ok(());
        };

        render(self.session.search_trips(&query));
        Ok(())
    }

    fn stats(&self) {
        render(self.session.stats());
    }
}

/// Read one free-text answer; Ctrl-C/Ctrl-D cancels back to the menu
fn ask(rl: &mut DefaultEditor, label: &str) -> Result<Option<String>> {
    match prompt(rl, label)? {
        Answer::Text(text) => Ok(Some(text)),
        Answer::Cancelled => {
            println!("{}", "(cancelled)".dimmed());
            Ok(None)
        }
    }
}

fn prompt(rl: &mut DefaultEditor, label: &str) -> Result<Answer> {
    match rl.readline(&format!("{} ", label.bright_green())) {
        Ok(line) => Ok(Answer::Text(line.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(Answer::Cancelled),
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    }
}

/// Print a session result, keeping the menu alive on operation errors
fn render(result: Result<String, SessionError>) {
    println!();
    match result {
        Ok(text) => println!("{}", text),
        Err(SessionError::Validation(msg)) => println!("{} {}", "!".yellow(), msg),
        Err(err) => println!("{} {}", "Error:".red(), err),
    }
}
