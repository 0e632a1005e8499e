use anyhow::{bail, Context, Result};
use chrono::Utc;
use jot_core::{Category, Priority, SortKey, StatusFilter, TaskParser, TaskPatch, TaskQuery};
use jot_model::build_parser;
use tracing::debug;

use crate::auth::load_auth;
use crate::config::Config;
use crate::render::{record_details, record_line, task_details};
use crate::store::TaskStore;

/// Build the parser chain from config. `offline` skips the model entirely.
pub fn make_parser(config: &Config, offline: bool) -> Result<TaskParser> {
    let options = config.parser_options()?;
    if offline {
        debug!("offline: rule-based parsing only");
        return Ok(TaskParser::rule_based(options));
    }
    let auth = load_auth()?;
    Ok(build_parser(options, config.model_config(&auth)))
}

fn join_text(words: &[String]) -> String {
    words.join(" ")
}

pub fn parse(config: &Config, text: &[String], offline: bool, json: bool) -> Result<()> {
    let parser = make_parser(config, offline)?;
    let task = parser.parse(&join_text(text));
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        print!("{}", task_details(&task, &parser.options().timezone));
    }
    Ok(())
}

pub fn add(config: &Config, text: &[String], offline: bool) -> Result<()> {
    let parser = make_parser(config, offline)?;
    let task = parser.parse(&join_text(text));

    let mut store = TaskStore::open_default()?;
    let record = store.insert(task, Utc::now()).clone();
    store.save()?;

    println!("Added task {}", record.id);
    print!("{}", record_details(&record, &parser.options().timezone));
    Ok(())
}

pub struct ListArgs {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub overdue: bool,
    pub due_before: Option<String>,
    pub sort: SortKey,
    pub reverse: bool,
    pub json: bool,
}

pub fn list(config: &Config, args: ListArgs) -> Result<()> {
    let parser = TaskParser::rule_based(config.parser_options()?);
    let tz = parser.options().timezone;
    let now = Utc::now();
    let due_before = match args.due_before {
        Some(expr) => match parser.resolve_due_at(&expr, now) {
            Some(d) => Some(d),
            None => bail!("could not read a date from '{expr}'"),
        },
        None => None,
    };

    let store = TaskStore::open_default()?;
    let query = TaskQuery {
        status: args.status,
        priority: args.priority,
        category: args.category,
        tag: args.tag,
        overdue: args.overdue,
        due_before,
        sort: args.sort,
        reverse: args.reverse,
    };

    let rows = query.run(store.records(), now);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for r in rows {
        println!("{}", record_line(r, &tz, now));
    }
    Ok(())
}

pub fn show(config: &Config, id: u64) -> Result<()> {
    let tz = config.parser_options()?.timezone;
    let store = TaskStore::open_default()?;
    print!("{}", record_details(store.get(id)?, &tz));
    Ok(())
}

pub fn done(id: u64) -> Result<()> {
    let mut store = TaskStore::open_default()?;
    store.get_mut(id)?.mark_done(Utc::now());
    store.save()?;
    println!("Completed task {id}");
    Ok(())
}

pub fn reopen(id: u64) -> Result<()> {
    let mut store = TaskStore::open_default()?;
    store.get_mut(id)?.reopen();
    store.save()?;
    println!("Reopened task {id}");
    Ok(())
}

pub fn remove(id: u64) -> Result<()> {
    let mut store = TaskStore::open_default()?;
    let r = store.remove(id)?;
    store.save()?;
    println!("Removed task {id}: {}", r.task.title);
    Ok(())
}

pub struct EditArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub tags: Option<Vec<String>>,
}

/// Turn edit flags into a patch. `--due` text goes through the due-date rules.
pub fn build_patch(parser: &TaskParser, args: EditArgs) -> Result<TaskPatch> {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.map(Some)
    };
    let due_date = if args.clear_due {
        Some(None)
    } else if let Some(expr) = args.due {
        let Some(due) = parser.resolve_due_at(&expr, Utc::now()) else {
            bail!("could not read a due date from '{expr}'");
        };
        Some(Some(due))
    } else {
        None
    };
    Ok(TaskPatch {
        title: args.title,
        description,
        priority: args.priority,
        category: args.category,
        due_date,
        tags: args.tags,
    })
}

pub fn edit(config: &Config, id: u64, args: EditArgs) -> Result<()> {
    let parser = TaskParser::rule_based(config.parser_options()?);
    let patch = build_patch(&parser, args)?;
    if patch.is_empty() {
        bail!("nothing to change (see jot edit --help)");
    }

    let mut store = TaskStore::open_default()?;
    let record = store.get_mut(id)?;
    record.apply(patch);
    let record = record.clone();
    store.save().with_context(|| format!("save edit of task {id}"))?;

    println!("Updated task {id}");
    print!("{}", record_details(&record, &parser.options().timezone));
    Ok(())
}
