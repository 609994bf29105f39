//! `jldd` — dependency lister analogous to `ldd`.
//!
//! For each `.class`/`.jar` given, resolves every referenced class against a
//! boot classpath and a user classpath, printing which jar or directory
//! (grouped by package) supplies each referenced package, or `???` when
//! nothing on either classpath resolves it.

mod bootprobe;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jloader::archive::Archive;
use jloader::class_file::ClassFile;
use jloader::classpath::{self, ClasspathIndex};
use jloader::pipeline::{Filter, Located, Pipeline};
use jloader::symbols::{self, SymbolKind};

#[derive(Parser, Debug)]
#[command(name = "jldd", author, version, about = "List class dependencies of Java class files", long_about = None)]
struct Args {
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// User classpath (':'-separated). Defaults to the `CLASSPATH` env var.
    #[arg(short = 'c', long = "classpath", value_name = "PATH")]
    classpath: Option<String>,

    /// Boot classpath (':'-separated). Defaults to an auto-detected or
    /// hardcoded boot classpath when omitted.
    #[arg(short = 'b', long = "bootclasspath", value_name = "PATH")]
    bootclasspath: Option<String>,

    /// Resolve field and method references too, not just classes.
    #[arg(short = 'r', long = "resolve-all")]
    resolve_all: bool,

    /// Use 32-bit pointers when sizing reference/array fields.
    #[arg(long = "m32")]
    m32: bool,
    /// Use 64-bit pointers (default).
    #[arg(long = "m64")]
    m64: bool,
}

impl Args {
    fn user_classpath(&self) -> Vec<PathBuf> {
        let raw = self
            .classpath
            .clone()
            .or_else(|| std::env::var("CLASSPATH").ok())
            .unwrap_or_default();
        split_paths(&raw)
    }

    /// §6: explicit `--bootclasspath`, else env/probe-discovered boot
    /// classpath, else (on Darwin) a fixed JDK 6 jar list, else none — in
    /// which case references only ever resolve against the user classpath.
    fn boot_classpath(&self) -> Vec<PathBuf> {
        if let Some(raw) = &self.bootclasspath {
            return split_paths(raw);
        }
        if let Some((paths, _sep)) = bootprobe::probe() {
            return paths.into_iter().map(PathBuf::from).collect();
        }
        if cfg!(target_os = "macos") {
            return bootprobe::darwin_fallback().into_iter().map(PathBuf::from).collect();
        }
        Vec::new()
    }
}

fn split_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(':').filter(|s| !s.is_empty()).map(PathBuf::from).collect()
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                clap::error::ErrorKind::UnknownArgument => 1,
                _ => 2,
            };
            err.print().ok();
            return ExitCode::from(code);
        }
    };

    jloader::set_pointer_size(if args.m32 { 4 } else { 8 });

    let boot = match ClasspathIndex::build(&args.boot_classpath()) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("jldd: failed to index boot classpath: {err}");
            return ExitCode::from(2);
        }
    };
    let user = match ClasspathIndex::build(&args.user_classpath()) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("jldd: failed to index classpath: {err}");
            return ExitCode::from(2);
        }
    };

    let mut filters = vec![Filter::RemoveDefined];
    if !args.resolve_all {
        filters.push(Filter::RemoveNonClass);
    }
    let pipeline = Pipeline {
        filters,
        ..Pipeline::default()
    };

    let multiple_sources = args.files.len() > 1;
    let mut had_error = false;

    for path in &args.files {
        let mut located = Vec::new();
        if let Err(err) = collect(path, &mut located) {
            eprintln!("{}: {err}", path.display());
            had_error = true;
            continue;
        }

        if multiple_sources {
            println!("{}:", path.display());
        }

        let referenced: Vec<String> = pipeline
            .run(located)
            .into_iter()
            .map(|(item, _)| owning_class(&item.symbol.kind, item.symbol.name))
            .collect();
        let report = classpath::resolve(&referenced, &boot, &user);

        for (package, sources) in &report.packages {
            let label = if package.is_empty() { "(default package)" } else { package.as_str() };
            if sources.is_empty() {
                println!("\t{label} => ???");
            } else {
                let rendered: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
                println!("\t{label} => {}", rendered.join(", "));
            }
        }

        if !report.unresolved.is_empty() {
            println!("Failed to resolve:");
            for fqcn in &report.unresolved {
                println!("\t{fqcn}");
            }
            had_error = true;
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// §4.8 resolves against class fqcns only. `RefClass` names already are one;
/// `RefStaticField`/`RefInstanceField`/`RefMethod` names are
/// `"pkg.Owner.member"` (`symbols::member_ref`'s shape) and must be trimmed
/// back to `"pkg.Owner"` before being handed to `classpath::resolve`, or
/// `-r`/`--resolve-all` would look up a non-existent "class" called
/// `pkg.Owner.member` and report every field/method reference as unresolved.
fn owning_class(kind: &SymbolKind, name: String) -> String {
    if kind.is_class() {
        return name;
    }
    match name.rsplit_once('.') {
        Some((owner, _member)) => owner.to_string(),
        None => name,
    }
}

fn collect(path: &PathBuf, out: &mut Vec<Located>) -> Result<(), Box<dyn std::error::Error>> {
    let is_jar = path.extension().and_then(|e| e.to_str()) == Some("jar");
    let source_file = path.display().to_string();
    if is_jar {
        let mut archive = Archive::open(path)?;
        for entry in archive.class_entries()? {
            match entry.result {
                Ok(class) => push_class(&source_file, Some(entry.name), &class, out)?,
                Err(err) => eprintln!("{source_file}({}): {err}", entry.name),
            }
        }
    } else {
        let bytes = std::fs::read(path)?;
        let class = ClassFile::parse(&bytes)?;
        push_class(&source_file, None, &class, out)?;
    }
    Ok(())
}

fn push_class(
    source_file: &str,
    jar_entry: Option<String>,
    class: &ClassFile,
    out: &mut Vec<Located>,
) -> Result<(), Box<dyn std::error::Error>> {
    let class_name = jloader::descriptors::fqcn(class.this_class_name()?);
    for symbol in symbols::extract(class)? {
        out.push(Located {
            source_file: source_file.to_string(),
            jar_entry: jar_entry.clone(),
            class_name: class_name.clone(),
            symbol,
        });
    }
    Ok(())
}
