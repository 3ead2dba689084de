//! Minimal CLI: decode documents through a schema, or print the schema's type graph
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use swagger_gen::{build_graph, compile, swagger, Descriptor, Scope};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// decode JSON documents into a typed model (Swagger 1.2 by default) and print them re-encoded
#[derive(Parser, Debug)]
#[command(name = "swagger-gen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode each input document as the root type
    Decode(DecodeOut),
    /// print every type reachable from the root and its dependencies
    Graph(GraphOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// JSON schema file; the built-in Swagger 1.2 model is used if omitted
    #[arg(long)]
    schema: Option<PathBuf>,

    /// root type name
    #[arg(long, default_value = "Definition")]
    root: String,
}

#[derive(clap::Parser, Debug)]
struct DecodeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// only report pass/fail per document
    #[arg(long)]
    check: bool,
}

#[derive(clap::Parser, Debug)]
struct GraphOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,
}

struct Document {
    label: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load(&self) -> Result<(Scope, Descriptor)> {
        let scope = match self.schema.as_ref() {
            Some(path) => swagger_gen::schema_file::load_scope(path)
                .with_context(|| format!("failed to load schema {}", path.display()))?,
            None => swagger::scope(),
        };
        if scope.resolve(&self.root).is_none() {
            bail!("root type `{}` is not defined in the schema", self.root);
        }
        Ok((scope, Descriptor::deferred(self.root.as_str())))
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = if source_path_str == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
                buf
            } else {
                std::fs::read_to_string(&source_path)
                    .with_context(|| format!("failed to read source file {source_path_str}"))?
            };

            let mut parsed = Vec::new();
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", line_no + 1);
                    let value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse JSON ({label})"))?;
                    parsed.push(Document { label, value });
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                parsed.push(Document { label: source_path_str.clone(), value });
            }

            for doc in parsed {
                documents.extend(self.preprocess(doc)?);
            }
        }
        Ok(documents)
    }

    fn preprocess(&self, doc: Document) -> Result<Vec<Document>> {
        let value = match self.json_pointer.as_deref() {
            None => doc.value,
            Some(pointer) => match doc.value.pointer(pointer) {
                Some(selected) => selected.clone(),
                None => bail!("JSON pointer {pointer} selects nothing in {}", doc.label),
            },
        };
        let Some(jq_expr) = self.jq_expr.as_ref() else {
            return Ok(vec![Document { label: doc.label, value }]);
        };
        let outputs = crate::jq_exec::run_jaq(jq_expr, &value)
            .with_context(|| format!("failed to apply jq expression to {}", doc.label))?;
        Ok(outputs
            .into_iter()
            .enumerate()
            .map(|(i, value)| Document { label: format!("{}#{i}", doc.label), value })
            .collect())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Decode(target) => {
                let (scope, root) = target.schema_settings.load()?;
                let registry = compile(&root, &scope).context("failed to compile schema")?;
                let documents = target.input_settings.load_documents()?;

                // the registry is read-only after construction
                let results: Vec<_> = documents
                    .par_iter()
                    .map(|doc| (doc.label.as_str(), registry.decode_root(&doc.value)))
                    .collect();

                let mut decoded = Vec::new();
                let mut failures = 0usize;
                for (label, result) in &results {
                    match result {
                        Ok(value) => {
                            if target.check {
                                eprintln!("{} {label}", "✅".green());
                            }
                            decoded.push(value.to_json());
                        }
                        Err(error) => {
                            failures += 1;
                            eprintln!("{} {label}: {error}", "❌".red());
                        }
                    }
                }

                if !target.check {
                    let out = match decoded.len() {
                        1 => decoded.remove(0),
                        _ => Value::Array(decoded),
                    };
                    let out_src = serde_json::to_string_pretty(&out)?;
                    if let Some(out) = target.out.as_ref() {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &out_src)?;
                    } else {
                        println!("{out_src}");
                    }
                }

                if failures > 0 {
                    bail!("{failures} of {} documents failed to decode", results.len());
                }
                Ok(())
            }
            Command::Graph(target) => {
                let (scope, root) = target.schema_settings.load()?;
                let graph = build_graph(&root, &scope).context("failed to build type graph")?;
                for (ty, deps) in graph.nodes() {
                    let deps: Vec<String> = deps.iter().map(ToString::to_string).collect();
                    println!("{} -> [{}]", ty.to_string().bold(), deps.join(", "));
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
