//! The local task list: `tasks.json` under the jot home directory.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use jot_core::{ParsedTask, TaskRecord};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_jot_home, write_atomic};

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_jot_home()?.join("tasks.json"))
}

pub struct TaskStore {
    path: PathBuf,
    records: Vec<TaskRecord>,
}

impl TaskStore {
    pub fn open_default() -> Result<Self> {
        Self::open(&tasks_path()?)
    }

    /// A missing file is an empty list.
    pub fn open(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            if s.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
            }
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn save(&self) -> Result<()> {
        let s = serde_json::to_string_pretty(&self.records).context("serialize tasks")?;
        write_atomic(&self.path, &s)
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    pub fn insert(&mut self, task: ParsedTask, now: DateTime<Utc>) -> &TaskRecord {
        let record = TaskRecord::from_parsed(self.next_id(), task, now);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn get(&self, id: u64) -> Result<&TaskRecord> {
        match self.records.iter().find(|r| r.id == id) {
            Some(r) => Ok(r),
            None => bail!("no task with id {id}"),
        }
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut TaskRecord> {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(r) => Ok(r),
            None => bail!("no task with id {id}"),
        }
    }

    pub fn remove(&mut self, id: u64) -> Result<TaskRecord> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            bail!("no task with id {id}");
        };
        Ok(self.records.remove(pos))
    }
}
