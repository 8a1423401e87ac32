use clap::{Parser, Subcommand};
use nutri_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutri")]
#[command(about = "Personal nutrition and activity ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the meal-log storage quota in bytes (0 disables the check)
    #[arg(long, global = true)]
    quota_bytes: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a meal from an analysis result and its photo
    LogMeal {
        /// Analysis service output (JSON)
        #[arg(long)]
        analysis: PathBuf,

        /// Captured meal photo
        #[arg(long)]
        image: PathBuf,

        /// Mime type of the photo
        #[arg(long, default_value = "image/jpeg")]
        mime: String,
    },

    /// Edit a logged meal (unspecified fields keep their current value)
    EditMeal {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        calories: Option<f64>,
    },

    /// Delete a logged meal
    DeleteMeal { id: String },

    /// Log an activity; calories are estimated from MET, weight and duration
    AddActivity {
        #[arg(long)]
        name: String,

        #[arg(long)]
        minutes: f64,

        /// light, moderate or vigorous
        #[arg(long, default_value = "moderate")]
        intensity: String,

        /// MET value from the lookup service; omit to use the resting fallback
        #[arg(long)]
        met: Option<f64>,
    },

    /// Delete a logged activity
    DeleteActivity { id: String },

    /// Set daily goals (unspecified fields keep their current value)
    SetGoals {
        #[arg(long)]
        calories: Option<f64>,

        #[arg(long)]
        protein: Option<f64>,

        #[arg(long)]
        carbs: Option<f64>,

        #[arg(long)]
        fat: Option<f64>,

        #[arg(long)]
        burned: Option<f64>,
    },

    /// Set profile measurements
    SetProfile {
        #[arg(long)]
        weight_kg: Option<f64>,

        #[arg(long)]
        height_cm: Option<f64>,
    },

    /// Show daily progress against goals
    Summary,

    /// Project and render the daily report
    Report {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Emit the raw section sequence as JSON for an external renderer
        #[arg(long)]
        json: bool,
    },

    /// Print the share link and summary for a meal
    Share { id: String },

    /// Resolve an inbound share link
    Open { url: String },
}

/// MET source standing in for an unconfigured lookup service
struct UnavailableMet;

impl MetLookup for UnavailableMet {
    fn lookup(&self, _activity: &str, _intensity: Intensity) -> Result<f64> {
        Err(Error::Analysis("no MET lookup service configured".into()))
    }
}

fn main() -> Result<()> {
    nutri_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let quota = match cli.quota_bytes {
        Some(0) => None,
        Some(q) => Some(q),
        None => config.storage.quota_bytes,
    };

    let storage = StorageDir::new(&data_dir).with_quota(quota);
    let mut store = LedgerStore::open(storage);

    match cli.command {
        Commands::LogMeal {
            analysis,
            image,
            mime,
        } => cmd_log_meal(&mut store, &analysis, &image, &mime),
        Commands::EditMeal {
            id,
            title,
            description,
            calories,
        } => cmd_edit_meal(&mut store, &id, title, description, calories),
        Commands::DeleteMeal { id } => {
            report_outcome(store.delete_meal(&id)?);
            println!("Deleted meal {}", id);
            Ok(())
        }
        Commands::AddActivity {
            name,
            minutes,
            intensity,
            met,
        } => cmd_add_activity(&mut store, &name, minutes, &intensity, met),
        Commands::DeleteActivity { id } => {
            store.delete_activity(&id)?;
            println!("Deleted activity {}", id);
            Ok(())
        }
        Commands::SetGoals {
            calories,
            protein,
            carbs,
            fat,
            burned,
        } => {
            let current = *store.goals();
            store.set_goals(DailyGoals {
                calories: calories.unwrap_or(current.calories),
                protein: protein.unwrap_or(current.protein),
                carbs: carbs.unwrap_or(current.carbs),
                fat: fat.unwrap_or(current.fat),
                burned_calories: burned.unwrap_or(current.burned_calories),
            })?;
            println!("Goals updated");
            Ok(())
        }
        Commands::SetProfile {
            weight_kg,
            height_cm,
        } => {
            let current = *store.profile();
            store.set_profile(UserProfile {
                weight_kg: weight_kg.unwrap_or(current.weight_kg),
                height_cm: height_cm.unwrap_or(current.height_cm),
            })?;
            println!("Profile updated");
            Ok(())
        }
        Commands::Summary => cmd_summary(&store),
        Commands::Report { out, json } => cmd_report(&store, out, json),
        Commands::Share { id } => cmd_share(&store, &config, &id),
        Commands::Open { url } => cmd_open(&store, &url),
    }
}

fn cmd_log_meal(
    store: &mut LedgerStore,
    analysis_path: &PathBuf,
    image_path: &PathBuf,
    mime: &str,
) -> Result<()> {
    let contents = std::fs::read_to_string(analysis_path)?;
    let analysis: MealAnalysis = serde_json::from_str(&contents)
        .map_err(|e| Error::Analysis(format!("unusable analysis result: {}", e)))?;

    let image = std::fs::read(image_path)?;
    let image_ref = encode_image_ref(&image, mime);

    let meal = MealEntry::from_analysis(
        analysis,
        new_entry_id(),
        types::display_timestamp(),
        image_ref,
    );
    let id = meal.id.clone();
    let calories = meal.calories;

    report_outcome(store.add_meal(meal)?);
    println!("Logged meal {} ({:.0} kcal)", id, calories);
    Ok(())
}

fn cmd_edit_meal(
    store: &mut LedgerStore,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    calories: Option<f64>,
) -> Result<()> {
    let mut meal = store
        .meal(id)
        .cloned()
        .ok_or_else(|| Error::Validation(format!("no meal with id {}", id)))?;

    if let Some(title) = title {
        meal.title = title;
    }
    if let Some(description) = description {
        meal.description = description;
    }
    if let Some(calories) = calories {
        meal.calories = calories;
    }

    report_outcome(store.update_meal(meal)?);
    println!("Updated meal {}", id);
    Ok(())
}

fn cmd_add_activity(
    store: &mut LedgerStore,
    name: &str,
    minutes: f64,
    intensity: &str,
    met: Option<f64>,
) -> Result<()> {
    let intensity: Intensity = intensity.parse()?;

    let met = match met {
        Some(value) => met_or_resting(&FixedMet(value), name, intensity),
        None => met_or_resting(&UnavailableMet, name, intensity),
    };

    let entry = build_activity(name, minutes, intensity, met, store.profile())?;
    let id = entry.id.clone();
    let burned = entry.calories_burned;

    store.add_activity(entry)?;
    println!("Logged activity {}: {} -{} kcal (MET {})", id, name, burned, met);
    Ok(())
}

fn cmd_summary(store: &LedgerStore) -> Result<()> {
    let totals = daily_totals(store.meals(), store.activities());
    let net = net_calories(&totals);
    let goals = store.goals();

    println!("Daily Progress");
    println!(
        "  Ingested: {:.0} kcal | Burned: {} kcal | Net: {:.0} kcal",
        totals.calories, totals.burned, net
    );
    println!();

    // Fixed metric order: burned, net, protein, carbs, fat
    print_metric("Activity", f64::from(totals.burned), goals.burned_calories, "kcal");
    print_metric("Calories (net)", net, goals.calories, "kcal");
    print_metric("Protein", totals.protein, goals.protein, "g");
    print_metric("Carbs", totals.carbs, goals.carbs, "g");
    print_metric("Fat", totals.fat, goals.fat, "g");

    Ok(())
}

fn print_metric(label: &str, current: f64, goal: f64, unit: &str) {
    let progress = goal_progress(current, goal);
    let marker = if progress > 100.0 { " [over]" } else { "" };
    println!(
        "  {:<15} {:>7.0} / {:.0} {} ({:.0}%){}",
        label, current, goal, unit, progress, marker
    );
}

fn cmd_report(store: &LedgerStore, out: Option<PathBuf>, json: bool) -> Result<()> {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let sections = project_report(store.meals(), store.activities(), store.goals(), &date);

    let rendered = if json {
        serde_json::to_string_pretty(&sections)?
    } else {
        render_sections(&sections)
    };

    match out {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Plain-text stand-in for the external document renderer
fn render_sections(sections: &[ReportSection]) -> String {
    let mut out = String::new();
    for section in sections {
        match section {
            ReportSection::Header { title, date } => {
                out.push_str(&format!("=== {} | {} ===\n\n", title, date));
            }
            ReportSection::DailySummary {
                metrics,
                net_calories,
            } => {
                out.push_str("Daily Summary\n");
                for m in metrics {
                    let marker = if m.percentage > 100 { " [over]" } else { "" };
                    out.push_str(&format!(
                        "  {}: {:.0} / {:.0} {} ({}%){}\n",
                        m.label, m.current, m.goal, m.unit, m.percentage, marker
                    ));
                }
                out.push_str(&format!("  Net balance: {:.0} kcal\n\n", net_calories));
            }
            ReportSection::Activities(lines) => {
                out.push_str("Activities\n");
                for a in lines {
                    out.push_str(&format!(
                        "  - {} ({}): {:.0} min | {} kcal (MET {})\n",
                        a.name, a.intensity, a.duration_minutes, a.calories_burned, a.met_value
                    ));
                }
                out.push('\n');
            }
            ReportSection::Meal(block) => {
                out.push_str(&format!("Meal: {}\n", block.title));
                out.push_str(&format!(
                    "  {} | {:.0} kcal\n",
                    block.timestamp, block.calories
                ));
                if !block.macros.is_empty() {
                    out.push_str("  Macros:\n");
                    for m in &block.macros {
                        out.push_str(&format!(
                            "    - {}: {:.1}{} ({}% of calories)\n",
                            m.name, m.amount, m.unit, m.calorie_share
                        ));
                    }
                }
                if !block.ingredients.is_empty() {
                    out.push_str("  Ingredients:\n");
                    for ing in &block.ingredients {
                        match ing.percentage {
                            Some(p) => out.push_str(&format!(
                                "    - {}: {}{} ({:.0}%)\n",
                                ing.name, ing.amount, ing.unit, p
                            )),
                            None => out.push_str(&format!(
                                "    - {}: {}{}\n",
                                ing.name, ing.amount, ing.unit
                            )),
                        }
                    }
                }
                out.push_str(&format!(
                    "  [image: {} bytes embedded]\n\n",
                    block.image_ref.len()
                ));
            }
        }
    }
    out
}

fn cmd_share(store: &LedgerStore, config: &Config, id: &str) -> Result<()> {
    let meal = store
        .meal(id)
        .ok_or_else(|| Error::ShareNotFound(id.to_string()))?;

    let link = share_link(&config.share.base_url, &meal.id);
    println!("{}", link);
    println!();
    print!("{}", share_summary(meal, &link));
    Ok(())
}

fn cmd_open(store: &LedgerStore, url: &str) -> Result<()> {
    match resolve(url, store.meals()) {
        ShareResolution::Normal => {
            println!("No shared meal reference; normal mode.");
        }
        ShareResolution::Shared(meal) => {
            println!("Shared meal (read-only)");
            println!();
            println!("  {}", meal.title);
            println!("  {} | {:.0} kcal", meal.timestamp, meal.calories);
            if !meal.description.is_empty() {
                println!("  {}", meal.description);
            }
            for m in &meal.macros {
                println!("  - {}: {:.1}{}", m.name, m.amount, m.unit);
            }
        }
        ShareResolution::NotFound(id) => {
            eprintln!("Meal {} not found or share link expired.", id);
            println!("Returning to normal mode.");
        }
    }
    Ok(())
}

fn report_outcome(outcome: PersistOutcome) {
    if let Some(warning) = outcome.warning() {
        eprintln!("Warning: {}", warning);
    }
}
