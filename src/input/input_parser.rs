use crate::base::{Diagnostics, Error, Result};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Holds the characters starting a comment
pub const COMMENT_CHARS: [char; 2] = ['#', '$'];

/// Holds the directives splicing other blocks (or files) into a simulation
const INSERT_KEYWORDS: [&str; 3] = ["use", "insert", "include"];

/// Holds the blocks that a simulation may contain
const RECOGNIZED_BLOCKS: [&str; 3] = ["boundary", "legs", "material"];

/// Holds blocks of the legacy input format that are accepted but ignored
const IGNORED_BLOCKS: [&str; 4] = ["mathplot", "extraction", "output", "name"];

/// Holds the options that are no longer supported
const DEPRECATED_OPTIONS: [&str; 1] = ["title"];

/// Maximum depth of nested insertions
const MAX_INSERT_DEPTH: usize = 16;

/// Holds the content of one `begin <kind> [name] … end <kind>` block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputBlock {
    /// Optional name given after the kind
    pub name: String,

    /// Lines of the block (comments removed; nested blocks excluded)
    pub content: Vec<String>,
}

impl InputBlock {
    /// Returns the content as a single string with one item per line
    pub fn text(&self) -> String {
        self.content.join("\n")
    }
}

/// Holds the input of one simulation
///
/// Blocks nested at any depth are stored by kind, e.g., the `legs` block
/// nested in the `boundary` block is available as `blocks["legs"]`.
#[derive(Clone, Debug, Default)]
pub struct SimulationInput {
    /// Simulation name
    pub name: String,

    /// Simulation options as (keyword, value) pairs; a bare keyword has the value `true`
    pub options: Vec<(String, String)>,

    /// Blocks by (lower case) kind
    pub blocks: BTreeMap<String, InputBlock>,
}

impl SimulationInput {
    /// Returns a required block
    pub fn block(&self, kind: &str) -> Result<&InputBlock> {
        self.blocks
            .get(kind)
            .ok_or_else(|| Error::parse(format!("{} block not found in input file", kind)))
    }

    /// Returns the value of an option
    pub fn option(&self, keyword: &str) -> Option<&str> {
        let keyword = keyword.to_lowercase();
        self.options.iter().find(|(k, _)| *k == keyword).map(|(_, v)| v.as_str())
    }

    /// Tells whether a boolean option is set
    pub fn flag(&self, keyword: &str) -> bool {
        matches!(
            self.option(keyword).map(|v| v.to_lowercase()).as_deref(),
            Some("true") | Some("1") | Some("yes") | Some("on")
        )
    }
}

/// Reads an input file
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_input_file<P>(full_path: &P) -> Result<Vec<SimulationInput>>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    let text = fs::read_to_string(&path)?;
    let base_dir = path.parent().map(|p| p.to_path_buf());
    parse_input(&text, base_dir.as_deref())
}

/// Parses the content of an input file
///
/// The file holds one or more `begin simulation <name> … end simulation` blocks
/// and, optionally, top-level named blocks that simulations splice in with
/// `use <block>` or `insert <block>`. When no top-level block has the requested
/// name, the directive names a file (relative to `base_dir`) whose lines are inserted.
///
/// All problems found in the pass are reported together.
pub fn parse_input(text: &str, base_dir: Option<&Path>) -> Result<Vec<SimulationInput>> {
    let mut diagnostics = Diagnostics::new();
    let lines = remove_comments(text.lines());
    let top_level = match split_top_level(&lines) {
        Ok(blocks) => blocks,
        Err(err) => {
            diagnostics.error(err);
            return diagnostics.finish().map(|_| Vec::new());
        }
    };

    let mut named = BTreeMap::new();
    for block in &top_level {
        if block.kind != "simulation" {
            named.insert(block.kind.clone(), block.lines.clone());
        }
    }

    let mut simulations = Vec::new();
    for block in top_level.iter().filter(|b| b.kind == "simulation") {
        if block.name.is_empty() {
            diagnostics.error(Error::parse(
                "did not find simulation name; simulation block must be of form: begin simulation <name> ... end simulation",
            ));
            continue;
        }
        let lines = match splice(&block.lines, &named, base_dir, 0) {
            Ok(lines) => lines,
            Err(err) => {
                diagnostics.error(err);
                continue;
            }
        };
        match parse_simulation(&block.name, &lines, &mut diagnostics) {
            Ok(simulation) => simulations.push(simulation),
            Err(err) => diagnostics.error(err),
        }
    }
    if simulations.is_empty() && diagnostics.error_count() == 0 {
        diagnostics.error(Error::parse("no simulation block found in input"));
    }
    diagnostics.finish()?;
    Ok(simulations)
}

/// Removes blank lines, full-line comments and inline comments
fn remove_comments<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut stripped = Vec::new();
    for line in lines {
        let line = match line.find(COMMENT_CHARS) {
            Some(pos) => &line[..pos],
            None => line,
        };
        let line = line.trim();
        if !line.is_empty() {
            stripped.push(line.to_string());
        }
    }
    stripped
}

/// Holds a top-level block before it is interpreted
struct RawBlock {
    kind: String,
    name: String,
    lines: Vec<String>,
}

/// Splits the input into top-level blocks (nested blocks are kept in the lines)
fn split_top_level(lines: &[String]) -> Result<Vec<RawBlock>> {
    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;
    let mut depth = 0;
    for line in lines {
        let tokens: Vec<String> = line.split_whitespace().map(|t| t.to_lowercase()).collect();
        match tokens[0].as_str() {
            "begin" => {
                if depth == 0 {
                    let kind = tokens
                        .get(1)
                        .ok_or_else(|| Error::parse("encountered a begin directive with no block type"))?;
                    current = Some(RawBlock {
                        kind: kind.clone(),
                        name: line.split_whitespace().skip(2).collect::<Vec<_>>().join("_"),
                        lines: Vec::new(),
                    });
                    depth = 1;
                    continue;
                }
                depth += 1;
            }
            "end" => {
                if depth == 0 {
                    return Err(Error::parse(format!("unexpected '{}' directive", line)));
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(block) = current.take() {
                        if tokens.get(1) != Some(&block.kind) {
                            return Err(Error::parse(format!(
                                "unexpected '{}' directive, expected 'end {}'",
                                line, block.kind
                            )));
                        }
                        blocks.push(block);
                    }
                    continue;
                }
            }
            _ => (),
        }
        if let Some(block) = current.as_mut() {
            block.lines.push(line.clone());
        }
    }
    if let Some(block) = current {
        return Err(Error::parse(format!("end of block '{}' not found", block.kind)));
    }
    Ok(blocks)
}

/// Replaces the `use`/`insert` directives by the lines of the referenced blocks or files
fn splice(
    lines: &[String],
    named: &BTreeMap<String, Vec<String>>,
    base_dir: Option<&Path>,
    depth: usize,
) -> Result<Vec<String>> {
    if depth > MAX_INSERT_DEPTH {
        return Err(Error::parse("too many nested insertions (recursive 'use' directive?)"));
    }
    let mut all = Vec::new();
    for line in lines {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("").to_lowercase();
        if !INSERT_KEYWORDS.contains(&keyword.as_str()) {
            all.push(line.clone());
            continue;
        }
        let target = tokens.collect::<Vec<_>>().join(" ");
        if target.is_empty() {
            return Err(Error::parse(format!("'{}' directive without a block name", keyword)));
        }
        let inserted = match named.get(&target.to_lowercase()) {
            Some(block) => block.clone(),
            None => {
                let path = match base_dir {
                    Some(dir) => dir.join(&target),
                    None => PathBuf::from(&target),
                };
                if !path.is_file() {
                    return Err(Error::parse(format!("'{}' block '{}' not found", keyword, target)));
                }
                let text = fs::read_to_string(&path)?;
                remove_comments(text.lines())
            }
        };
        all.extend(splice(&inserted, named, base_dir, depth + 1)?);
    }
    Ok(all)
}

/// Interprets the lines of one simulation block
fn parse_simulation(name: &str, lines: &[String], diagnostics: &mut Diagnostics) -> Result<SimulationInput> {
    let mut simulation = SimulationInput {
        name: name.to_string(),
        ..Default::default()
    };
    let mut stack: Vec<String> = Vec::new();
    for line in lines {
        let tokens: Vec<String> = line.split_whitespace().map(|t| t.to_lowercase()).collect();
        match tokens[0].as_str() {
            "begin" => {
                let kind = tokens
                    .get(1)
                    .ok_or_else(|| Error::parse("encountered a begin directive with no block type"))?
                    .clone();
                if simulation.blocks.contains_key(&kind) {
                    return Err(Error::parse(format!("duplicate block \"{}\" encountered", kind)));
                }
                let block = InputBlock {
                    name: line.split_whitespace().skip(2).collect::<Vec<_>>().join("_"),
                    content: Vec::new(),
                };
                simulation.blocks.insert(kind.clone(), block);
                stack.push(kind);
            }
            "end" => {
                let kind = tokens
                    .get(1)
                    .ok_or_else(|| Error::parse("encountered an end directive with no block type"))?;
                match stack.last() {
                    Some(last) if last == kind => {
                        stack.pop();
                    }
                    Some(last) => {
                        return Err(Error::parse(format!(
                            "unexpected \"end {}\" directive, expected \"end {}\"",
                            kind, last
                        )))
                    }
                    None => return Err(Error::parse(format!("unexpected \"end {}\" directive", kind))),
                }
            }
            _ => match stack.last() {
                Some(kind) => {
                    if let Some(block) = simulation.blocks.get_mut(kind) {
                        block.content.push(line.clone());
                    }
                }
                None => {
                    if let Some(option) = parse_option(line, diagnostics) {
                        simulation.options.push(option);
                    }
                }
            },
        }
    }
    if let Some(kind) = stack.last() {
        return Err(Error::parse(format!("end of block '{}' not found", kind)));
    }

    for kind in simulation.blocks.keys() {
        if IGNORED_BLOCKS.contains(&kind.as_str()) {
            diagnostics.warn(&format!("{} block is not supported and is ignored", kind));
        } else if !RECOGNIZED_BLOCKS.contains(&kind.as_str()) {
            diagnostics.error(Error::parse(format!("unrecognized block: {}", kind)));
        }
    }
    for kind in RECOGNIZED_BLOCKS {
        if !simulation.blocks.contains_key(kind) {
            diagnostics.error(Error::parse(format!("{} block not found in input file", kind)));
        }
    }
    Ok(simulation)
}

/// Parses one simulation option such as `nowriteprops` or `kappa = 0`
fn parse_option(line: &str, diagnostics: &mut Diagnostics) -> Option<(String, String)> {
    let line = line.replace([',', ';', ':', '='], " ");
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next()?.to_lowercase();
    if DEPRECATED_OPTIONS.contains(&keyword.as_str()) {
        diagnostics.warn(&format!("deprecated input file option [{}] skipped", keyword));
        return None;
    }
    let value = tokens.collect::<Vec<_>>().join(" ");
    let value = if value.is_empty() { "true".to_string() } else { value };
    Some((keyword, value))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
