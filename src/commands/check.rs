//! Check command implementation
//!
//! Resolves every external tool the pipeline may call and reports where
//! it was found. Exits non-zero when a signing tool is missing.

use anyhow::Result;
use clap::Args;

use crate::config::{ExtractMethod, Settings};
use crate::signing::KeystoreProvisioner;
use crate::utils::terminal;
use crate::utils::tools::{self, Tool, ToolInfo};

/// Check external tool availability
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    pub fn execute(self, verbose: bool, settings: Settings) -> Result<()> {
        println!("🔍 Checking external tools...");

        let mut checker = ToolChecker::new(verbose);
        terminal::print_section("External tools");
        for (tool, info) in tools::check_tools(&settings.tools) {
            checker.report(tool, info.as_ref());
        }

        terminal::print_section("Configuration");
        checker.print_info(&format!(
            "Extraction: {}",
            match settings.extract.method {
                ExtractMethod::Auto => "auto (unzip if found, else builtin)",
                ExtractMethod::Unzip => "unzip",
                ExtractMethod::Builtin => "builtin",
            }
        ));
        if settings.extract.method == ExtractMethod::Unzip
            && tools::locate(Tool::Unzip, &settings.tools).is_none()
        {
            checker.print_error("Extraction is set to unzip but unzip was not found");
        }
        match KeystoreProvisioner::new(&settings).debug_keystore_path() {
            Ok(path) if path.is_file() => {
                checker.print_ok(&format!("Debug keystore: {}", path.display()))
            }
            Ok(path) => checker.print_info(&format!(
                "Debug keystore: {} (generated on first use)",
                path.display()
            )),
            Err(e) => checker.print_warning(&e.to_string()),
        }
        checker.print_info(&format!(
            "Workspace root: {}",
            settings.workspace_root().display()
        ));

        checker.print_summary();

        if !checker.errors.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

struct ToolChecker {
    verbose: bool,
    warnings: Vec<String>,
    errors: Vec<String>,
    missing: Vec<Tool>,
}

impl ToolChecker {
    fn new(verbose: bool) -> Self {
        Self {
            verbose,
            warnings: Vec::new(),
            errors: Vec::new(),
            missing: Vec::new(),
        }
    }

    fn report(&mut self, tool: Tool, info: Option<&ToolInfo>) {
        match info {
            Some(info) => {
                match &info.version {
                    Some(version) => self.print_ok(&format!("{}: Found {}", info.name, version)),
                    None => self.print_ok(&format!("{}: Found", info.name)),
                }
                if self.verbose {
                    println!("      {}", info.path.display());
                }
            }
            None if tool.is_required() => {
                self.print_error(&format!(
                    "{}: Not found (needed for {})",
                    tool.name(),
                    tool.purpose()
                ));
                self.missing.push(tool);
            }
            None => {
                self.print_warning(&format!("{}: Not found ({})", tool.name(), tool.purpose()));
            }
        }
    }

    fn print_ok(&self, msg: &str) {
        println!("  ✅ {}", msg);
    }

    fn print_error(&mut self, msg: &str) {
        println!("  ❌ {}", msg);
        self.errors.push(msg.to_string());
    }

    fn print_warning(&mut self, msg: &str) {
        println!("  ⚠️  {}", msg);
        self.warnings.push(msg.to_string());
    }

    fn print_info(&self, msg: &str) {
        println!("  ℹ️  {}", msg);
    }

    fn print_summary(&self) {
        terminal::print_section("Summary");

        if self.errors.is_empty() {
            println!("  ✅ READY: conversion and signing are available");
        } else {
            println!("  ❌ NOT READY: {} error(s)", self.errors.len());
        }
        if !self.warnings.is_empty() {
            println!("  ⚠️  {} warning(s)", self.warnings.len());
        }

        if self.missing.iter().any(|t| t.is_jdk_tool()) {
            println!();
            terminal::print_info(crate::error::hints::jdk());
        }
    }
}
