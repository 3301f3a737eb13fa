//! CLI module for the notedex application
//!
//! This module turns parsed commands into calls on [`NoteStorage`] and prints
//! the results.
use std::{
    collections::BTreeSet,
    fs,
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use console::style;
use log::info;

use crate::{
    format_record_row, parse_tags, render_html, terminal_width, Commands, Config, DateField,
    DateRange, EditorLauncher, NoteRecord, NoteStorage, Result, ScoredNote, ShellEditor,
    SkipEditor,
};

/// CLI Application handler - processes CLI commands and interfaces with NoteStorage
pub struct App {
    /// The note storage backend
    storage: NoteStorage,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    pub fn new(storage: NoteStorage, verbose: bool) -> Self {
        Self { storage, verbose }
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        self.storage.initialize()?;

        match command {
            Commands::Open {
                title,
                template,
                no_edit,
            } => self.open_note(&title, template.as_deref(), no_edit)?,

            Commands::Rename { old, new } => {
                let record = self.storage.rename_note(&old, &new)?;
                println!("Renamed '{}' to '{}'", old, style(&record.title).bold());
            }

            Commands::Tag {
                title,
                tags,
                remove,
            } => {
                let tags = parse_tags(&tags);
                let record = if remove {
                    self.storage.remove_tags_from_note(&title, &tags)?
                } else {
                    self.storage.add_tags_to_note(&title, &tags)?
                };
                println!("{}: {}", style(&record.title).bold(), self.tag_list(&record));
            }

            Commands::Pin { title } => {
                if self.storage.pin(&title)? {
                    println!("Pinned '{}'", title);
                } else {
                    println!("'{}' is already pinned", title);
                }
            }

            Commands::Unpin { title } => {
                if self.storage.unpin(&title)? {
                    println!("Unpinned '{}'", title);
                } else {
                    println!("'{}' was not pinned", title);
                }
            }

            Commands::Pins => {
                let index = self.storage.load_index();
                let pinned: Vec<NoteRecord> = self
                    .storage
                    .list_pinned()
                    .into_iter()
                    .filter_map(|title| index.get(&title).cloned())
                    .collect();
                self.display_notes(&pinned);
            }

            Commands::Delete { title } => {
                let destination = self.storage.delete_note(&title)?;
                println!("Moved '{}' to the trash", title);
                if self.verbose {
                    println!("  {}", destination.display());
                }
            }

            Commands::Recover { title } => {
                let record = self.storage.recover_note(&title)?;
                println!("Recovered '{}' to {}", record.title, record.file_path);
            }

            Commands::Trash { query } => {
                let titles = match query {
                    Some(q) => self.storage.search_trash(&q)?,
                    None => self.storage.list_trashed()?,
                };
                if titles.is_empty() {
                    println!("Trash is empty.");
                }
                for title in titles {
                    println!("{}", title);
                }
            }

            Commands::EmptyTrash { force } => self.handle_empty_trash(force)?,

            Commands::List => self.display_notes(&self.storage.list_notes()),

            Commands::Search {
                query,
                tags,
                all,
                fuzzy,
            } => self.handle_search(query, tags, all, fuzzy)?,

            Commands::Date { from, to, created } => {
                let range = DateRange::parse(&from, to.as_deref())?;
                let field = if created {
                    DateField::Created
                } else {
                    DateField::Modified
                };
                let mut notes = self.storage.search_by_date(&range, field);
                notes.sort_by(|a, b| b.modified.cmp(&a.modified));
                self.display_notes(&notes);
            }

            Commands::Recent { limit } => self.display_notes(&self.storage.recent_notes(limit)),

            Commands::Tags { limit } => {
                for tag in self.storage.popular_tags(limit)? {
                    println!("{:>5}  {}", tag.count, style(format!("#{}", tag.tag)).cyan());
                }
            }

            Commands::Reindex => {
                let summary = self.storage.reindex_all()?;
                println!("Indexed {} notes, {} tags", summary.notes, summary.tags);
                if summary.shadowed > 0 {
                    println!(
                        "{} notes skipped because another file has the same title",
                        summary.shadowed
                    );
                }
                if summary.pruned_pins > 0 {
                    println!("Dropped {} pins of missing notes", summary.pruned_pins);
                }
            }

            Commands::Render { title, output } => self.handle_render(&title, output)?,

            Commands::Templates => {
                for name in self.storage.list_templates()? {
                    println!("{}", name);
                }
            }

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    fn open_note(&self, title: &str, template: Option<&str>, no_edit: bool) -> Result<()> {
        let editor: Box<dyn EditorLauncher> = if no_edit {
            Box::new(SkipEditor)
        } else {
            Box::new(ShellEditor::new(self.storage.config().get_editor_command()))
        };

        let record = self.storage.create_or_open_note(title, editor.as_ref(), template)?;
        info!("Indexed '{}' ({} words)", record.title, record.word_count);
        if self.verbose || no_edit {
            println!("{}", record.file_path);
        }
        Ok(())
    }

    fn handle_search(
        &self,
        query: Option<String>,
        tags: Vec<String>,
        all: bool,
        fuzzy: bool,
    ) -> Result<()> {
        let tags = parse_tags(&tags);

        if !tags.is_empty() {
            if all {
                self.display_notes(&self.storage.filter_by_all_tags(&tags));
            } else {
                self.display_scored(&self.storage.search_by_tags(&tags)?);
            }
            return Ok(());
        }

        let query = query.unwrap_or_default();
        let mut hits = if fuzzy {
            self.storage.fuzzy_search_titles(&query)
        } else {
            self.storage.search_by_title(&query)
        };
        if !fuzzy {
            hits.sort_by(|a, b| a.record.title.cmp(&b.record.title));
        }
        self.display_scored(&hits);
        Ok(())
    }

    fn handle_empty_trash(&self, force: bool) -> Result<()> {
        let trashed = self.storage.list_trashed()?;
        if trashed.is_empty() {
            println!("Trash is empty.");
            return Ok(());
        }

        if !force {
            print!(
                "Permanently delete {} trashed notes? [y/N]: ",
                trashed.len()
            );
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let removed = self.storage.empty_trash()?;
        println!("Removed {} notes from the trash", removed);
        Ok(())
    }

    fn handle_render(&self, title: &str, output: Option<PathBuf>) -> Result<()> {
        let record = self.storage.get_note(title)?;
        let content = fs::read_to_string(&record.file_path)?;
        let html = render_html(&content);

        match output {
            Some(path) => {
                fs::write(&path, html)?;
                println!("Wrote {}", path.display());
            }
            None => print!("{}", html),
        }
        Ok(())
    }

    fn handle_config(&self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        let paths = self.storage.paths();
        let show = show || (set.is_none() && !reset);

        if reset {
            Config::default().save(paths)?;
            println!("Configuration reset to defaults");
        }

        if let Some(assignment) = set {
            let mut config = Config::load(paths)?;
            config.set(&assignment)?;
            config.save(paths)?;
            println!("Updated {}", assignment);
        }

        if show {
            let config = Config::load(paths)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Ok(())
    }

    fn tag_list(&self, record: &NoteRecord) -> String {
        if record.tags.is_empty() {
            return style("(no tags)").dim().to_string();
        }
        record
            .tags
            .iter()
            .map(|t| style(format!("#{}", t)).cyan().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn display_notes(&self, notes: &[NoteRecord]) {
        if notes.is_empty() {
            println!("No notes found.");
            return;
        }

        let pinned: BTreeSet<String> = self.storage.list_pinned().into_iter().collect();
        let width = terminal_width();
        for record in notes {
            println!(
                "{}",
                format_record_row(record, pinned.contains(&record.title), width)
            );
        }
    }

    fn display_scored(&self, hits: &[ScoredNote]) {
        if hits.is_empty() {
            println!("No notes found.");
            return;
        }

        let pinned: BTreeSet<String> = self.storage.list_pinned().into_iter().collect();
        let width = terminal_width().saturating_sub(6);
        for hit in hits {
            println!(
                "{:>4}  {}",
                style(hit.score).green(),
                format_record_row(&hit.record, pinned.contains(&hit.record.title), width)
            );
        }
    }
}
