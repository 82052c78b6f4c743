use clap::Parser;
use mapimport::host::png::render_preview;
use mapimport::{BiomePalette, CommandRegistry, ImportMapCommand, ImportOptions, SceneGraph};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Импорт карты из Fantasy Map Generator (полный JSON-экспорт)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к JSON-экспорту карты
    input: PathBuf,

    /// Параметры импорта в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Высота плоскости океана (0–100, в единицах высоты карты)
    #[arg(long)]
    ocean_height: Option<f32>,

    /// Вертикальный масштаб рельефа (0.001–1)
    #[arg(long)]
    vertical_scale: Option<f32>,

    /// Не скрывать маршруты после импорта
    #[arg(long)]
    show_routes: bool,

    /// Брать цвета биомов из самого файла
    #[arg(long)]
    document_palette: bool,

    /// Сохранить вид сверху на сцену в PNG
    #[arg(short, long)]
    preview: Option<PathBuf>,

    /// Пикселей на единицу координат в превью
    #[arg(long, default_value_t = 1.0)]
    pixels_per_unit: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка параметров из {}...", path.display());
            ImportOptions::from_toml_file(path)?
        }
        None => ImportOptions::default(),
    };
    if let Some(ocean_height) = cli.ocean_height {
        options.ocean_height = ocean_height;
    }
    if let Some(vertical_scale) = cli.vertical_scale {
        options.vertical_scale = vertical_scale;
    }
    options.show_routes |= cli.show_routes;
    if cli.document_palette {
        options.palette = BiomePalette::Document;
    }

    let mut registry = CommandRegistry::new();
    let command = ImportMapCommand;
    registry.register(Box::new(command));

    println!("Импорт {:?}...", cli.input);
    let mut scene = SceneGraph::new();
    let report = registry
        .invoke(mapimport::Command::id(&command), &mut scene, &cli.input, &options)
        .ok_or("Import command is not registered")??;

    println!("\nКарта «{}» → коллекция {}", report.map_name, report.collection);
    println!(
        "  {}: {} граней, {} вершин ({} ячеек под водой)",
        report.terrain, report.terrain_faces, report.terrain_vertices, report.submerged_cells
    );
    println!("  {}: плоскость океана", report.ocean);
    println!("  Реки: {} (пропущено {})", report.rivers.len(), report.skipped_rivers);
    println!(
        "  Маршруты: {} (пропущено {}, разрывов {}, {})",
        report.routes.len(),
        report.skipped_routes,
        report.route_discontinuities,
        if options.show_routes { "видимы" } else { "скрыты" }
    );
    println!("  Поселения: {}", report.burgs);

    if let Some(path) = &cli.preview {
        println!("Сохранение превью в {path:?}");
        render_preview(&scene, &path.to_string_lossy(), cli.pixels_per_unit)?;
    }

    println!("\nГотово!");
    Ok(())
}
