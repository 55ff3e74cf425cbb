//! Command handlers. Each invocation mutates an already-loaded library and
//! persists the result.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ms_app::{
    InsertOutcome, LibraryError, LibrarySettings, MediaLibrary, PersistError, SaveDebouncer,
    SaveOutcome,
};
use ms_core::entry::{
    CategoryFilter, Entry, EntryMetadata, EntryOrigin, MediaKind, MimeType, Payload,
};
use ms_core::ids::EntryId;
use ms_core::ports::StorageTier;
use tracing::{info, warn};

use crate::cli::Command;

/// Upper bound on waiting for thumbnails before the final save.
const THUMBNAIL_WAIT: Duration = Duration::from_secs(5);

const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// MIME type guessed from a file extension or URL path.
pub fn mime_for_path(path: &str) -> MimeType {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "m3u8" => HLS_MIME,
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => return MimeType::octet_stream(),
    };
    MimeType(mime.to_string())
}

fn kind_for(mime: &MimeType) -> MediaKind {
    // HLS playlists are played as video.
    if mime.as_str() == HLS_MIME {
        return MediaKind::Video;
    }
    MediaKind::from_mime(mime)
}

fn entry_from_file(path: &Path, stream: bool, tags: &[String]) -> Result<Entry> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let mime = mime_for_path(&name);
    let kind = kind_for(&mime);

    let (payload, size) = if stream {
        let absolute = std::fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let size = std::fs::metadata(&absolute)
            .with_context(|| format!("Failed to stat {}", absolute.display()))?
            .len();
        (
            Payload::transient(absolute.to_string_lossy().into_owned()),
            size,
        )
    } else {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let size = bytes.len() as u64;
        (Payload::inline(mime, bytes), size)
    };

    let metadata = EntryMetadata::new(name, size, kind).with_tags(tags.iter().cloned());
    Ok(Entry::new(metadata, payload, EntryOrigin::LocalUpload))
}

fn entry_from_url(url: &str, name: Option<String>, allow_save: bool) -> Entry {
    let mime = mime_for_path(url);
    let kind = kind_for(&mime);
    let name = name.unwrap_or_else(|| {
        url.split(['?', '#'])
            .next()
            .unwrap_or(url)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(url)
            .to_string()
    });
    let metadata = EntryMetadata::new(name, 0, kind).with_allow_save(allow_save);
    Entry::new(metadata, Payload::remote(url), EntryOrigin::RemoteUrl)
}

pub async fn run(
    command: Command,
    library: &mut MediaLibrary,
    settings: &LibrarySettings,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Add {
            paths,
            stream,
            tags,
        } => run_add(library, settings, &paths, stream, &tags, out).await,
        Command::AddUrl {
            url,
            name,
            allow_save,
        } => {
            let entry = entry_from_url(&url, name, allow_save);
            let added = insert_one(library, entry, out)?;
            persist(library, &added, out).await
        }
        Command::List { filter, search } => run_list(library, filter, search.as_deref(), out),
        Command::Remove { id } => {
            let id = EntryId::from(id);
            match library.remove_entry(&id) {
                Some(entry) => {
                    writeln!(out, "removed {} {}", entry.id, entry.name())?;
                    persist(library, &[], out).await
                }
                None => bail!(LibraryError::NotFound(id)),
            }
        }
        Command::Tag { id, tags } => {
            let id = EntryId::from(id);
            let entry = library.update_tags(&id, tags)?;
            writeln!(out, "{} tags: {}", entry.id, entry.metadata.tags.join(","))?;
            persist(library, &[], out).await
        }
        Command::Reacquire { path, stream } => {
            let entry = entry_from_file(&path, stream, &[])?;
            let has_target = library.entries().iter().any(|existing| {
                existing.needs_reacquisition
                    && existing.metadata.name == entry.metadata.name
                    && existing.metadata.size_bytes == entry.metadata.size_bytes
            });
            if !has_target {
                bail!(
                    "No entry waiting for {} ({} bytes)",
                    entry.metadata.name,
                    entry.metadata.size_bytes
                );
            }
            insert_one(library, entry, out)?;
            library.drain_thumbnails(THUMBNAIL_WAIT).await;
            persist(library, &[], out).await
        }
        Command::Stats => run_stats(library, out),
        Command::Clear { yes } => {
            if !yes {
                bail!(
                    "Refusing to delete {} entries without --yes",
                    library.len()
                );
            }
            let count = library.len();
            library.clear_all().await;
            writeln!(out, "cleared {count} entries")?;
            Ok(())
        }
    }
}

/// Insert one entry and report it. Duplicates are reported, not fatal.
fn insert_one(
    library: &mut MediaLibrary,
    entry: Entry,
    out: &mut dyn Write,
) -> Result<Vec<EntryId>> {
    match library.insert_if_not_duplicate(entry) {
        Ok(InsertOutcome::Inserted(entry)) => {
            writeln!(out, "added {} {}", entry.id, entry.name())?;
            Ok(vec![entry.id])
        }
        Ok(InsertOutcome::Reacquired(entry)) => {
            writeln!(out, "reacquired {} {}", entry.id, entry.name())?;
            Ok(Vec::new())
        }
        Err(LibraryError::DuplicateEntry {
            existing_id,
            reason,
        }) => {
            writeln!(out, "skipped duplicate of {existing_id} ({reason})")?;
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_add(
    library: &mut MediaLibrary,
    settings: &LibrarySettings,
    paths: &[std::path::PathBuf],
    stream: bool,
    tags: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let debouncer = SaveDebouncer::spawn(library.selector(), settings.save_debounce);
    let mut added = Vec::new();

    for path in paths {
        let entry = match entry_from_file(path, stream, tags) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "Skipping file");
                writeln!(out, "failed {}: {err:#}", path.display())?;
                continue;
            }
        };
        added.extend(insert_one(library, entry, out)?);
        library.poll_thumbnails();
        debouncer.request(library.snapshot());
    }

    library.drain_thumbnails(THUMBNAIL_WAIT).await;
    debouncer.request(library.snapshot());
    let outcome = debouncer.shutdown().await;

    match outcome {
        Some(outcome) => handle_outcome(library, outcome, &added, out).await,
        None => Ok(()),
    }
}

/// Save the whole library, evicting `added` newest-first while the storage
/// quota is exceeded.
async fn persist(library: &mut MediaLibrary, added: &[EntryId], out: &mut dyn Write) -> Result<()> {
    let outcome = library.persist_all().await;
    handle_outcome(library, outcome, added, out).await
}

async fn handle_outcome(
    library: &mut MediaLibrary,
    mut outcome: SaveOutcome,
    added: &[EntryId],
    out: &mut dyn Write,
) -> Result<()> {
    let mut evictable = added.to_vec();
    loop {
        match outcome {
            Ok(StorageTier::None) => {
                warn!("Library could not be saved; changes last for this session only");
                writeln!(out, "warning: nothing could be saved")?;
                return Ok(());
            }
            Ok(tier) => {
                info!(tier = tier.as_str(), count = library.len(), "Library saved");
                return Ok(());
            }
            Err(PersistError::QuotaExceeded {
                needed_bytes,
                limit_bytes,
            }) => {
                let Some(newest) = evictable.pop() else {
                    bail!(
                        "Storage full: {needed_bytes} bytes needed, limit is {limit_bytes} bytes"
                    );
                };
                if let Some(entry) = library.remove_entry(&newest) {
                    warn!(entry_id = %entry.id, "Storage full; dropped newest addition");
                    writeln!(out, "storage full, dropped {} {}", entry.id, entry.name())?;
                }
                outcome = library.persist_all().await;
            }
        }
    }
}

fn status_of(entry: &Entry) -> &'static str {
    if entry.needs_reacquisition {
        "lost"
    } else if entry.has_inline_payload() {
        "saved"
    } else {
        "stream"
    }
}

fn run_list(
    library: &MediaLibrary,
    filter: Option<CategoryFilter>,
    search: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut entries = library.list_entries(filter);
    if let Some(term) = search {
        let matching: Vec<EntryId> = library.search_tags(term).into_iter().map(|e| e.id).collect();
        entries.retain(|entry| matching.contains(&entry.id));
    }

    for entry in &entries {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            entry.id,
            entry.metadata.kind.as_str(),
            status_of(entry),
            entry.metadata.size_bytes,
            entry.name(),
            entry.metadata.tags.join(",")
        )?;
    }
    Ok(())
}

fn run_stats(library: &MediaLibrary, out: &mut dyn Write) -> Result<()> {
    let count = |filter| library.list_entries(Some(filter)).len();
    writeln!(out, "entries: {}", library.len())?;
    writeln!(out, "saved: {}", count(CategoryFilter::Saved))?;
    writeln!(out, "streaming: {}", count(CategoryFilter::Streaming))?;
    writeln!(out, "needs reacquisition: {}", count(CategoryFilter::NeedsReacquisition))?;
    writeln!(out, "images: {}", count(CategoryFilter::Image))?;
    writeln!(out, "audio: {}", count(CategoryFilter::Audio))?;
    writeln!(out, "video: {}", count(CategoryFilter::Video))?;
    writeln!(out, "stored bytes: {}", library.stored_size_bytes())?;
    writeln!(out, "storage tier: {}", library.active_tier().as_str())?;
    Ok(())
}
