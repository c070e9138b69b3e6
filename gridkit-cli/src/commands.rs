//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use gridkit_lib::EngineBackends;
use gridkit_lib::GridClient;
use gridkit_lib::TableEngine;
use gridkit_lib::auth::StaticHeaderProvider;
use gridkit_lib::column::EditInput;
use gridkit_lib::compile::CompiledMatrix;
use gridkit_lib::config::EngineConfig;
use gridkit_lib::model::ColumnFilter;
use gridkit_lib::model::FilterState;
use gridkit_lib::model::FilterType;
use gridkit_lib::model::RowId;
use gridkit_lib::model::Sort;
use gridkit_lib::model::TableConfig;
use gridkit_lib::optimistic::SaveOutcome;
use gridkit_lib::presets::PresetKind;
use gridkit_lib::presets::SqlitePresetBackend;
use gridkit_lib::presets::TableSnapshot;

use crate::cli::Cli;
use crate::cli::EditArgs;
use crate::cli::FetchArgs;
use crate::cli::KindArg;
use crate::cli::PageArgs;
use crate::cli::PresetAction;
use crate::error::CliError;
use crate::paths;

impl From<KindArg> for PresetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Filters => PresetKind::Filters,
            KindArg::Columns => PresetKind::Columns,
        }
    }
}

pub fn load_table(cli: &Cli) -> Result<TableConfig, CliError> {
    let json = std::fs::read_to_string(&cli.table).map_err(|source| CliError::ReadTable {
        path: cli.table.clone(),
        source,
    })?;
    TableConfig::from_json(&json).map_err(CliError::InvalidTable)
}

/// Builds the client and engine described by the global arguments.
pub async fn engine(cli: &Cli, table: TableConfig) -> Result<TableEngine, CliError> {
    let url = cli.url.clone().ok_or(CliError::MissingUrl)?;
    let timeout = Duration::from_secs(cli.timeout);
    let headers = match &cli.csrf_token {
        Some(token) => StaticHeaderProvider::csrf(token.clone()),
        None => StaticHeaderProvider::none(),
    };

    let client = GridClient::builder()
        .url(url)
        .header_provider(headers)
        .timeout(timeout)
        .build()?;

    let mut backends = EngineBackends::from_client(&client);
    if cli.offline {
        let path = paths::presets_db().ok_or(CliError::NoDataDir)?;
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        log::info!("using offline presets at {}", path.display());
        let backend = SqlitePresetBackend::open(&path)
            .await
            .map_err(gridkit_lib::Error::from)?;
        backends = backends.with_presets(Arc::new(backend));
    }

    let settings = EngineConfig::default().with_request_timeout(timeout);
    Ok(TableEngine::new(table, settings, backends))
}

// =============================================================================
// compile
// =============================================================================

pub fn compile(table: &TableConfig) {
    let matrix = CompiledMatrix::compile(&table.fields);

    println!(
        "{:<20} {:<12} {:>5}  {:<7} {:<7} {:<11} EDITABLE",
        "KEY", "TYPE", "ORDER", "PANEL", "SHOWN", "FILTER"
    );
    for config in &matrix.field_configs {
        let visibility = matrix.column_visibility.get(&config.key);
        let filter = config
            .filter_type
            .map(|filter| format!("{filter:?}").to_lowercase())
            .unwrap_or_else(|| "-".to_string());
        let mut surfaces = Vec::new();
        if config.edit.inline {
            surfaces.push("inline");
        }
        if config.edit.add_modal {
            surfaces.push("add");
        }
        if config.edit.edit_modal {
            surfaces.push("edit");
        }

        println!(
            "{:<20} {:<12} {:>5}  {:<7} {:<7} {:<11} {}",
            config.key,
            config.field_type().as_str(),
            config.order,
            yes_no(visibility.is_some_and(|v| v.in_panel)),
            yes_no(visibility.is_some_and(|v| v.default_visible)),
            filter,
            surfaces.join(",")
        );
    }
    println!("\ncolumn order: {}", matrix.column_order.join(", "));
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

// =============================================================================
// fetch
// =============================================================================

pub async fn fetch(engine: &TableEngine, args: &FetchArgs) -> Result<(), CliError> {
    engine.load_reference_data().await?;

    let mut filters = FilterState::new();
    for raw in &args.filters {
        filters.set(parse_filter(engine.matrix(), raw)?);
    }
    let snapshot = TableSnapshot {
        filters,
        sorting: args.sort.as_deref().map(parse_sort),
        global_filter: args.search.clone().unwrap_or_default(),
        ..TableSnapshot::default()
    };
    engine.restore(PresetKind::Filters, snapshot);

    load_page(engine, &args.page).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&engine.rows())?);
    } else {
        print_page(engine);
    }
    Ok(())
}

async fn load_page(engine: &TableEngine, page: &PageArgs) -> Result<(), CliError> {
    if let Some(size) = page.page_size {
        engine.restore(
            PresetKind::Columns,
            TableSnapshot {
                page_size: Some(size),
                ..TableSnapshot::default()
            },
        );
    }
    engine.set_page(page.page).await?;

    if let Some(error) = engine.error() {
        log::warn!("page load reported: {error}");
    }
    Ok(())
}

/// `-field` sorts descending, anything else ascending.
pub fn parse_sort(raw: &str) -> Sort {
    match raw.strip_prefix('-') {
        Some(field) => Sort::desc(field),
        None => Sort::asc(raw),
    }
}

/// Parses `KEY=VALUE` into a filter of the field's filter type.
///
/// Multiselect values are comma separated ids, ranges are `MIN..MAX` with
/// either side optional.
pub fn parse_filter(matrix: &CompiledMatrix, raw: &str) -> Result<ColumnFilter, CliError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CliError::InvalidFilter(raw.to_string()))?;

    let filter_type = matrix.field(key).and_then(|config| config.filter_type);
    let filter = match filter_type {
        Some(FilterType::Boolean) => {
            let selected: Vec<bool> = value
                .split(',')
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .collect();
            ColumnFilter::boolean(key, &selected)
        }
        Some(FilterType::Multiselect) => {
            ColumnFilter::multiselect(key, value.split(',').map(str::trim).filter(|v| !v.is_empty()))
        }
        Some(FilterType::Range) => {
            let (min, max) = value
                .split_once("..")
                .ok_or_else(|| CliError::InvalidFilter(raw.to_string()))?;
            let bound = |s: &str| s.trim().parse::<f64>().ok();
            ColumnFilter::range(key, bound(min), bound(max))
        }
        _ => ColumnFilter::text(key, value),
    };
    Ok(filter)
}

fn print_page(engine: &TableEngine) {
    let columns: Vec<_> = engine
        .columns()
        .into_iter()
        .filter(|column| column.field_config().is_some())
        .collect();

    let headers: Vec<&str> = columns.iter().map(|column| column.header()).collect();
    println!("{}", headers.join(" | "));

    for row in engine.rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| column.render(&row).plain_text())
            .collect();
        println!("{}", cells.join(" | "));
    }

    let pagination = engine.pagination();
    println!(
        "\npage {} of {} ({} rows)",
        pagination.page_index + 1,
        engine.page_count().max(1),
        engine.count()
    );
}

// =============================================================================
// edit
// =============================================================================

pub async fn edit(engine: &TableEngine, args: &EditArgs) -> Result<(), CliError> {
    engine.load_reference_data().await?;
    load_page(engine, &args.page).await?;

    let id = RowId::new(args.id.as_str());
    let input = match &args.value {
        Some(value) => EditInput::Text(value.clone()),
        None => EditInput::Clear,
    };

    engine.begin_edit(&id, &args.field)?;
    match engine.commit_edit(&id, &args.field, input).await? {
        SaveOutcome::Committed(_) => {
            let column = engine.column(&args.field)?;
            let shown = engine
                .row(&id)
                .map(|row| column.render(&row).plain_text())
                .unwrap_or_default();
            println!("saved {}.{} = {shown}", args.id, args.field);
            Ok(())
        }
        SaveOutcome::Reverted(error) => Err(gridkit_lib::Error::from(error).into()),
        SaveOutcome::Rejected => Err(CliError::SaveRejected {
            id: args.id.clone(),
            field: args.field.clone(),
        }),
    }
}

// =============================================================================
// presets
// =============================================================================

pub async fn presets(engine: &TableEngine, action: &PresetAction) -> Result<(), CliError> {
    engine.load_presets().await?;

    match action {
        PresetAction::List { kind } => {
            let kind = PresetKind::from(*kind);
            for preset in engine.presets(kind).presets() {
                println!("{:<30} {}", preset.name, preset.timestamp.format("%Y-%m-%d %H:%M"));
            }
        }
        PresetAction::Save { kind, name } => {
            engine.save_preset((*kind).into(), name).await?;
            println!("saved preset '{name}'");
        }
        PresetAction::Apply { kind, name } => {
            engine.load_reference_data().await?;
            engine.apply_preset((*kind).into(), name).await?;
            print_page(engine);
        }
        PresetAction::Delete { kind, name } => {
            engine.delete_preset((*kind).into(), name).await?;
            println!("deleted preset '{name}'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkit_lib::model::FieldDescriptor;
    use gridkit_lib::model::FieldType;
    use gridkit_lib::model::FilterValue;

    fn matrix() -> CompiledMatrix {
        let table = TableConfig::new("/api/pits", "pits")
            .field("name", FieldDescriptor::new(FieldType::Text).filter(FilterType::Text))
            .field("active", FieldDescriptor::new(FieldType::Boolean).filter(FilterType::Boolean))
            .field("depth", FieldDescriptor::new(FieldType::Number).filter(FilterType::Range));
        CompiledMatrix::compile(&table.fields)
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("-depth"), Sort::desc("depth"));
        assert_eq!(parse_sort("name"), Sort::asc("name"));
    }

    #[test]
    fn test_parse_filter_by_type() {
        let matrix = matrix();

        let range = parse_filter(&matrix, "depth=..20").unwrap();
        assert!(matches!(
            range.value,
            FilterValue::Range(ref r) if r.min.is_none() && r.max == Some(20.0)
        ));

        let flag = parse_filter(&matrix, "active=true").unwrap();
        assert_eq!(flag, ColumnFilter::boolean("active", &[true]));

        let text = parse_filter(&matrix, "name=pit=1").unwrap();
        assert_eq!(text, ColumnFilter::text("name", "pit=1"));
    }

    #[test]
    fn test_parse_filter_rejects_missing_key() {
        assert!(matches!(parse_filter(&matrix(), "=x"), Err(CliError::InvalidFilter(_))));
        assert!(matches!(parse_filter(&matrix(), "depth=5"), Err(CliError::InvalidFilter(_))));
    }
}
