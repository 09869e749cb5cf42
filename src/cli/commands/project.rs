//! Project commands.
//!
//! `fluxloop-env project add|list|use|remove` manage the registry of
//! FluxLoop projects stored under `$FLUXLOOP_HOME`.

use crate::cli::args::{ProjectAddArgs, ProjectListArgs, ProjectRemoveArgs, ProjectUseArgs};
use crate::dispatch::TerminalSink;
use crate::error::{FluxError, Result};
use crate::project::ProjectEntry;
use crate::session::Session;
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::router::{Command, CommandContext, CommandOutcome};

fn describe(project: &ProjectEntry) -> String {
    format!("{} ({})", project.name, project.workspace_path().display())
}

fn lookup<'a>(session: &'a Session, key: &str) -> Result<&'a ProjectEntry> {
    session
        .registry()
        .find(key)
        .ok_or_else(|| FluxError::UnknownProject {
            id: key.to_string(),
        })
}

/// Ask the user to pick a registered project and make it active.
///
/// Returns `false` when there is nothing to pick from.
pub(crate) fn pick_project(session: &mut Session, ui: &mut dyn UserInterface) -> Result<bool> {
    let projects = session.registry().list();
    if projects.is_empty() {
        return Ok(false);
    }

    let prompt = Prompt {
        key: "project".to_string(),
        question: "Select a FluxLoop project".to_string(),
        options: projects
            .iter()
            .map(|p| PromptOption::new(describe(p), p.id.clone()))
            .collect(),
        default: session.active_project().map(|p| p.id.clone()),
    };

    let id = ui.select(&prompt)?;
    session.set_active_project(Some(&id))?;
    Ok(true)
}

pub struct ProjectAddCommand {
    args: ProjectAddArgs,
}

impl ProjectAddCommand {
    pub fn new(args: ProjectAddArgs) -> Self {
        Self { args }
    }
}

impl Command for ProjectAddCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let entry = ctx.dispatcher.session_mut().add_project(
            &self.args.path,
            self.args.name.as_deref(),
            self.args.source_root.as_deref(),
            !self.args.no_activate,
        )?;

        ui.success(&format!("Registered {} [{}]", describe(&entry), entry.id));
        if !entry.has_config {
            ui.warning("No FluxLoop configuration found under configs/ yet.");
        }
        Ok(CommandOutcome::success())
    }
}

pub struct ProjectListCommand {
    args: ProjectListArgs,
}

impl ProjectListCommand {
    pub fn new(args: ProjectListArgs) -> Self {
        Self { args }
    }
}

impl Command for ProjectListCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let session = ctx.dispatcher.session();
        let projects = session.registry().list();

        if self.args.json {
            let json = serde_json::to_string_pretty(&projects)
                .map_err(|e| FluxError::Other(e.into()))?;
            println!("{}", json);
            return Ok(CommandOutcome::success());
        }

        if projects.is_empty() {
            ui.message("No projects registered. Add one with 'fluxloop-env project add <DIR>'.");
            return Ok(CommandOutcome::success());
        }

        let active = session.active_project().map(|p| p.id.as_str());
        ui.show_header("FluxLoop Projects");
        for project in projects {
            let marker = if Some(project.id.as_str()) == active { "*" } else { " " };
            ui.message(&format!("{} {}  {}", marker, project.id, describe(project)));
        }
        Ok(CommandOutcome::success())
    }
}

pub struct ProjectUseCommand {
    args: ProjectUseArgs,
}

impl ProjectUseCommand {
    pub fn new(args: ProjectUseArgs) -> Self {
        Self { args }
    }
}

impl Command for ProjectUseCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let session = ctx.dispatcher.session_mut();

        if self.args.none {
            session.set_active_project(None)?;
            ui.success("Cleared the active project.");
            return Ok(CommandOutcome::success());
        }

        match &self.args.project {
            Some(key) => {
                let id = lookup(session, key)?.id.clone();
                session.set_active_project(Some(&id))?;
            }
            None => {
                if !pick_project(session, ui)? {
                    ui.error("No projects registered.");
                    return Ok(CommandOutcome::failure(1));
                }
            }
        }

        if let Some(project) = session.active_project() {
            ui.success(&format!("Active project: {}", describe(project)));
        }
        Ok(CommandOutcome::success())
    }
}

pub struct ProjectRemoveCommand {
    args: ProjectRemoveArgs,
}

impl ProjectRemoveCommand {
    pub fn new(args: ProjectRemoveArgs) -> Self {
        Self { args }
    }
}

impl Command for ProjectRemoveCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let session = ctx.dispatcher.session_mut();
        let id = lookup(session, &self.args.project)?.id.clone();
        let removed = session.remove_project(&id)?;
        ui.success(&format!("Removed {}", describe(&removed)));
        Ok(CommandOutcome::success())
    }
}
