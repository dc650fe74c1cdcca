use adtree_config::Config;
use adtree_engine::{
    DirectoryNode, DirectoryTree, DirectoryTreeItem, DistinguishedName, LdifRecord,
    ReaderOptions, io,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    collections::HashMap,
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "[--scalar] [--raw-guid] [--order] [ldif-file]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    ldif_path: Option<PathBuf>,
    scalar: bool,
    raw_guid: bool,
    order: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    for arg in args {
        match arg.as_str() {
            "--scalar" => parsed.scalar = true,
            "--raw-guid" => parsed.raw_guid = true,
            "--order" => parsed.order = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{flag}'")),
            path if parsed.ldif_path.is_none() => parsed.ldif_path = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument '{extra}'")),
        }
    }
    Ok(parsed)
}

struct App {
    tree: DirectoryTree,
    tree_items: Vec<DirectoryTreeItem>,
    list_state: ListState,
    records: HashMap<DistinguishedName, LdifRecord>,
    current_content: Vec<String>,
}

impl App {
    fn new(tree: DirectoryTree, records: Vec<LdifRecord>) -> Self {
        let tree_items = tree.get_items();
        let records = records
            .into_iter()
            .map(|record| (record.dn().clone(), record))
            .collect();

        let mut app = Self {
            tree,
            tree_items,
            list_state: ListState::default(),
            records,
            current_content: Vec::new(),
        };

        // Select first item if available
        if !app.tree_items.is_empty() {
            app.list_state.select(Some(0));
            app.update_content_for_selection();
        }

        app
    }

    fn next_entry(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.tree_items.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_entry(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => self.tree_items.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn selected_item(&self) -> Option<&DirectoryTreeItem> {
        self.list_state
            .selected()
            .and_then(|index| self.tree_items.get(index))
    }

    fn update_content_for_selection(&mut self) {
        if let Some(content) = self.selected_item().map(|item| self.describe(&item.node)) {
            self.current_content = content;
        }
    }

    fn describe(&self, node: &DirectoryNode) -> Vec<String> {
        let records: Vec<&LdifRecord> = node
            .records
            .iter()
            .filter_map(|dn| self.records.get(dn))
            .collect();
        let mut lines = match records.as_slice() {
            [] => {
                let mut lines = vec![format!("📁 {}", node.name)];
                if !node.dn.is_empty() {
                    lines.push(node.dn.to_string());
                }
                lines.push(String::new());
                lines.push("Not present in this export; implied by its children.".to_string());
                lines.push(format!("{} direct children", node.children.len()));
                lines
            }
            records => {
                let mut lines = Vec::new();
                for record in records {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.extend(render_record(record));
                }
                lines
            }
        };
        if node.is_container() {
            lines.push(String::new());
            lines.push("Press Enter/Space to toggle, → to expand, ← to collapse".to_string());
        }
        lines
    }

    fn refresh_items(&mut self) {
        self.tree_items = self.tree.get_items();
        self.update_content_for_selection();
    }

    fn selected_container(&self) -> Option<DistinguishedName> {
        self.selected_item()
            .filter(|item| item.node.is_container())
            .map(|item| item.node.dn.clone())
    }

    fn toggle_selected(&mut self) {
        if let Some(dn) = self.selected_container() {
            self.tree.toggle(&dn);
            self.refresh_items();
        }
    }

    fn expand_selected(&mut self) {
        if let Some(dn) = self.selected_container() {
            self.tree.expand(&dn);
            self.refresh_items();
        }
    }

    fn collapse_selected(&mut self) {
        if let Some(dn) = self.selected_container() {
            self.tree.collapse(&dn);
            self.refresh_items();
        }
    }
}

fn render_record(record: &LdifRecord) -> Vec<String> {
    let dn = record.dn();
    let mut lines = vec![
        format!("dn: {dn}"),
        format!("{}: {} (depth {})", dn.name_type(), dn.name(), dn.depth()),
        String::new(),
    ];

    for attribute in record.attributes() {
        for value in &attribute.values {
            lines.push(format!("{}: {}", attribute.name, value));
        }
    }

    lines
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let raw_args: Vec<String> = env::args().collect();
    let program = raw_args.first().map(String::as_str).unwrap_or("adtree-cli");
    let args = match parse_args(raw_args.get(1..).unwrap_or_default()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let (config, first_run) = match Config::load() {
        Ok(Some(config)) => (config, false),
        Ok(None) => (Config::default(), true),
        Err(e) if args.ldif_path.is_some() => {
            log::warn!("Ignoring unreadable config file: {e}");
            (Config::default(), false)
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    let from_config = args.ldif_path.is_none();
    let Some(ldif_path) = args.ldif_path.clone().or(config.ldif_path.clone()) else {
        eprintln!("Error: No LDIF file provided and none configured");
        eprintln!("Usage: {program} {USAGE}");
        eprintln!("Or set ldif_path in {}", config_path.display());
        process::exit(1);
    };

    if let Err(e) = io::validate_ldif_file(&ldif_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: LDIF path '{}'{} is invalid: {e}",
            ldif_path.display(),
            source
        );
        process::exit(1);
    }

    if first_run && !from_config {
        remember_first_export(&ldif_path);
    }

    let options = ReaderOptions {
        scalar: args.scalar || config.scalar,
        raw_guid: args.raw_guid || config.raw_guid,
    };
    let records = io::read_ldif_file(&ldif_path, options)
        .with_context(|| format!("Failed to read {}", ldif_path.display()))?;
    let tree = DirectoryTree::build_from_records(io::source_label(&ldif_path), &records);

    if args.order {
        for dn in tree.creation_order() {
            println!("{dn}");
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tree, records);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Saves the first export opened as the default for later runs.
fn remember_first_export(ldif_path: &Path) {
    match Config::remembering(ldif_path).save() {
        Ok(()) => log::info!(
            "Remembering {} in {}",
            ldif_path.display(),
            Config::config_path().display()
        ),
        Err(e) => log::warn!("Failed to save config: {e:#}"),
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_entry(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_entry(),
                KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
                KeyCode::Right => app.expand_selected(),
                KeyCode::Left => app.collapse_selected(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(f.area());

    // Directory panel
    let entries: Vec<ListItem> = app
        .tree_items
        .iter()
        .map(|item| {
            let indent = "  ".repeat(item.depth);
            let icon = match (item.node.is_container(), item.node.is_expanded) {
                (true, true) => "📂 ",
                (true, false) => "📁 ",
                (false, _) => "📄 ",
            };
            let style = if item.node.has_record() || item.depth == 0 {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let display_text = format!("{}{}{}", indent, icon, item.node.name);
            ListItem::new(vec![Line::from(vec![Span::styled(display_text, style)])])
        })
        .collect();

    let directory = List::new(entries)
        .block(Block::default().borders(Borders::ALL).title("Directory"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(directory, chunks[0], &mut app.list_state);

    // Entry panel
    let content_text = if app.current_content.is_empty() {
        vec![Line::from("Select an entry to view its attributes")]
    } else {
        app.current_content
            .iter()
            .map(|line| Line::from(vec![Span::raw(line.clone())]))
            .collect()
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Entry"))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(content, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next | "),
        Span::raw("Enter/Space: Toggle | →: Expand | ←: Collapse"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    // Place help at bottom
    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use adtree_engine::parse_ldif;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        assert_eq!(parse_args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_args_flags_and_path() {
        let parsed = parse_args(&args(&["--order", "corp.ldif", "--scalar"])).unwrap();
        assert_eq!(
            parsed,
            Args {
                ldif_path: Some(PathBuf::from("corp.ldif")),
                scalar: true,
                raw_guid: false,
                order: true,
            }
        );
    }

    #[test]
    fn test_parse_args_rejects_unknown_and_extra() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["a.ldif", "b.ldif"])).is_err());
    }

    fn sample_app() -> App {
        let records = parse_ldif(
            "dn: CN=Sam,OU=Staging,DC=example\ncn: Sam\nmemberOf: CN=Admins,DC=example\n",
            ReaderOptions::default(),
        )
        .unwrap();
        let tree = DirectoryTree::build_from_records("test.ldif", &records);
        App::new(tree, records)
    }

    #[test]
    fn test_navigation_and_expansion() {
        let mut app = sample_app();
        assert_eq!(app.tree_items.len(), 2);

        app.next_entry();
        app.expand_selected();
        assert_eq!(app.tree_items.len(), 3);

        app.next_entry();
        app.toggle_selected();
        assert_eq!(app.tree_items.len(), 4);

        app.next_entry();
        assert_eq!(app.current_content[0], "dn: CN=Sam,OU=Staging,DC=example");
        assert!(app.current_content.contains(&"cn: Sam".to_string()));

        app.next_entry();
        assert_eq!(app.list_state.selected(), Some(0));
        app.previous_entry();
        assert_eq!(app.list_state.selected(), Some(3));
    }

    #[test]
    fn test_differently_spelled_records_are_both_shown() {
        let records = parse_ldif(
            "dn: OU=Staging,DC=x\ndescription: first\n\n\
             dn: OU=Staging, DC=x\ndescription: second\n",
            ReaderOptions::default(),
        )
        .unwrap();
        let tree = DirectoryTree::build_from_records("test.ldif", &records);
        let mut app = App::new(tree, records);

        app.next_entry();
        app.expand_selected();
        app.next_entry();
        assert!(app.current_content.contains(&"dn: OU=Staging,DC=x".to_string()));
        assert!(app.current_content.contains(&"description: first".to_string()));
        assert!(app.current_content.contains(&"dn: OU=Staging, DC=x".to_string()));
        assert!(app.current_content.contains(&"description: second".to_string()));
    }

    #[test]
    fn test_placeholder_content() {
        let mut app = sample_app();
        app.next_entry();
        assert_eq!(app.current_content[0], "📁 DC=example");
        assert!(app.current_content[1..].iter().any(|l| l.contains("implied")));
    }
}
