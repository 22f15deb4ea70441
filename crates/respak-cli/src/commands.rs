//! Command implementations. Each writes its report to `out`.

use std::io::Write;

use anyhow::{Context, Result, bail};
use respak_glob::WildcardPattern;
use respak_kernel::{
    CatalogConfig, IoProvider, LanguageRegistry, ResourceCatalog, ResourceId, ResourcePack,
};

/// `respak packs`: list the selected packs.
pub async fn packs(config: &CatalogConfig, out: &mut impl Write) -> Result<()> {
    let packs = config.load_packs().await.context("loading packs")?;
    if packs.is_empty() {
        writeln!(out, "no packs in {}", config.packs_dir.display())?;
        return Ok(());
    }
    for pack in &packs {
        let compatible = match &config.version {
            Some(host) if !pack.supports(host) => " (incompatible)",
            _ => "",
        };
        write!(out, "{}\t{}{compatible}", pack.name(), pack.version())?;
        if let Some(description) = &pack.descriptor().description {
            write!(out, "\t{description}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

async fn find_pack(config: &CatalogConfig, name: &str) -> Result<ResourcePack> {
    let packs = ResourcePack::discover(&config.packs_root())
        .await
        .context("discovering packs")?;
    match packs.into_iter().find(|p| p.name() == name) {
        Some(pack) => Ok(pack),
        None => bail!("no pack named {name:?} in {}", config.packs_dir.display()),
    }
}

/// `respak ls`: list a directory inside a pack.
pub async fn ls(
    config: &CatalogConfig,
    pack: &str,
    path: &str,
    recursive: bool,
    filter: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let pack = find_pack(config, pack).await?;
    let dir = pack.root().create_child(path);
    let filter = filter.map(WildcardPattern::parse).transpose()?;

    let (dirs, files) = if recursive {
        (
            dir.list_all_directories().await?,
            dir.list_all_files(filter.as_ref()).await?,
        )
    } else {
        (
            dir.list_directories().await?,
            dir.list_files(filter.as_ref()).await?,
        )
    };

    let mut entries: Vec<String> = dirs
        .iter()
        .map(|d| format!("{}/", relative(&dir, d)))
        .chain(files.iter().map(|f| relative(&dir, f)))
        .collect();
    entries.sort();
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    Ok(())
}

fn relative(base: &IoProvider, child: &IoProvider) -> String {
    child.path().strip_prefix(base.path()).to_string()
}

/// `respak cat`: copy a file from a pack to `out`.
pub async fn cat(config: &CatalogConfig, pack: &str, path: &str, out: &mut impl Write) -> Result<()> {
    let pack = find_pack(config, pack).await?;
    let file = pack.root().create_child(path);
    let bytes = file
        .read_all_bytes()
        .await
        .with_context(|| format!("reading {path} from {}", pack.name()))?;
    out.write_all(&bytes)?;
    Ok(())
}

/// `respak lang`: resolve a language file through the catalog.
pub async fn lang(config: &CatalogConfig, id: &str, key: Option<&str>, out: &mut impl Write) -> Result<()> {
    let id = ResourceId::parse(id).with_context(|| format!("invalid identifier {id:?}"))?;
    let packs = config.load_packs().await.context("loading packs")?;

    let catalog = ResourceCatalog::new();
    catalog.register::<LanguageRegistry>();
    catalog.reload(&packs).await.context("indexing packs")?;

    let Some(language) = catalog.get_scope::<LanguageRegistry>(&id).await else {
        bail!("language {id} not found or failed to load");
    };

    match key {
        Some(key) => match language.get(key) {
            Some(text) => writeln!(out, "{text}")?,
            None => bail!("{id} has no entry for {key:?}"),
        },
        None => {
            for (key, text) in language.iter() {
                writeln!(out, "{key}\t{text}")?;
            }
        }
    }
    Ok(())
}
