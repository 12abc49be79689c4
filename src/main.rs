//! Interactive entry point.
//!
//! Wires a [`Session`] to a minimal line-oriented console surface. The real
//! deployment replaces [`ConsoleSurface`] with the widget-toolkit frontend
//! and [`ChannelSource`] with the vendor capture adapter; this binary keeps
//! the whole loop exercisable without either.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use dronelab::prelude::*;

/// Line-oriented stand-in for the widget toolkit: one keypress-style menu,
/// simple prompts for form data.
struct ConsoleSurface {
    input: io::Stdin,
}

impl ConsoleSurface {
    fn new() -> Self {
        Self { input: io::stdin() }
    }

    fn prompt(&mut self, label: &str) -> Option<String> {
        print!("{}: ", label);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match self.input.lock().read_line(&mut line) {
            Ok(0) => None, // EOF
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(_) => None,
        }
    }

    fn status_line(view: &SessionView) -> String {
        format!(
            "{} object(s) | link {} | {} binding(s){}",
            view.objects.len(),
            view.connection,
            view.bindings.len(),
            if view.recording { " | REC" } else { "" }
        )
    }

    // None only on EOF; a bad pick re-prompts.
    fn pick_kind(&mut self) -> Option<ObjectKind> {
        for (i, kind) in ObjectKind::ALL.iter().enumerate() {
            println!("  [{}] {}", i + 1, kind.xml_tag());
        }
        loop {
            let choice = self.prompt("kind")?;
            let picked = choice
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| ObjectKind::ALL.get(i))
                .copied();
            match picked {
                Some(kind) => return Some(kind),
                None => println!("unrecognized kind \"{}\"", choice.trim()),
            }
        }
    }

    fn building_form(&mut self) -> Option<OperatorAction> {
        let kind = self.pick_kind()?;
        let name = self.prompt("name (blank = auto)")?;
        let name = if name.trim().is_empty() { None } else { Some(name) };
        let position = self.prompt("position \"x y z\"")?;
        let orientation = self.prompt("orientation \"w x y z\" (blank = identity)")?;
        Some(OperatorAction::AddBuilding {
            kind,
            name,
            position,
            orientation,
        })
    }

    fn naming_form(&mut self) -> Option<OperatorAction> {
        let mut pairs = Vec::new();
        loop {
            let name = self.prompt("drone name (blank = done)")?;
            if name.trim().is_empty() {
                break;
            }
            let rigid_body = self.prompt("rigid body id")?;
            pairs.push((name, RigidBodyId::new(rigid_body)));
        }
        Some(OperatorAction::NameDrones(pairs))
    }
}

impl ControlSurface for ConsoleSurface {
    fn next_action(&mut self, view: &SessionView) -> Option<OperatorAction> {
        println!();
        println!("{}", Self::status_line(view));
        println!(
            "[b] add building  [d] add drones  [n] name drones  [c] connect  \
             [x] disconnect  [r] record  [s] save  [q] quit"
        );
        loop {
            let key = self.prompt(">")?;
            let action = match key.trim() {
                "b" => self.building_form()?,
                "d" => OperatorAction::AddDrones,
                "n" => self.naming_form()?,
                "c" => OperatorAction::Connect,
                "x" => OperatorAction::Disconnect,
                "r" => OperatorAction::ToggleRecording,
                "s" => {
                    let path = self.prompt("file (blank = scene.xml)")?;
                    let path = if path.trim().is_empty() {
                        PathBuf::from("scene.xml")
                    } else {
                        PathBuf::from(path.trim())
                    };
                    OperatorAction::SaveScene(path)
                }
                "q" => OperatorAction::Quit,
                other => {
                    println!("unknown command \"{}\"", other);
                    continue;
                }
            };
            return Some(action);
        }
    }

    fn report(&mut self, message: &str) {
        println!("{}", message);
    }

    fn report_error(&mut self, error: &CommandError) {
        println!("error: {}", error);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // The sender half stays alive for the whole session so the in-process
    // feed reads as connected-but-idle rather than immediately closed.
    let (_feed, mut session) = dronelab::default();

    let mut surface = ConsoleSurface::new();
    session.run(&mut surface);
    Ok(())
}
