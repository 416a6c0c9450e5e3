use super::SummaryTable;
use crate::errors::ExportError;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Polygon,
};

// US letter, millimetres.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;

const TITLE_SIZE: f32 = 18.0;
const CELL_SIZE: f32 = 10.0;
const CELL_WIDTH: f32 = 34.0;
const CELL_HEIGHT: f32 = 9.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - 45.0;

// Helvetica averages roughly half an em per glyph; good enough to centre short cells.
const GLYPH_WIDTH_EM: f32 = 0.5;
const MM_PER_PT: f32 = 0.352_778;

pub(super) fn render_table(table: &SummaryTable) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) =
        PdfDocument::new(&table.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "summary");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
    let layer = doc.get_page(page).get_layer(layer);

    centred_text(&layer, &table.title, TITLE_SIZE, PAGE_WIDTH / 2.0, PAGE_HEIGHT - 30.0, &bold);

    let grid = &table.rows;
    let columns = grid.first().map_or(0, |row| row.len());
    let table_width = CELL_WIDTH * columns as f32;
    let left = (PAGE_WIDTH - table_width) / 2.0;
    let bottom = TABLE_TOP - CELL_HEIGHT * grid.len() as f32;

    shade_header(&layer, left, table_width);

    layer.set_fill_color(black());
    for (row_index, row) in grid.iter().enumerate() {
        let font = if row_index == 0 { &bold } else { &regular };
        let baseline = TABLE_TOP - CELL_HEIGHT * (row_index as f32 + 1.0) + CELL_HEIGHT * 0.32;
        for (column, text) in row.iter().enumerate() {
            let centre = left + CELL_WIDTH * (column as f32 + 0.5);
            centred_text(&layer, text, CELL_SIZE, centre, baseline, font);
        }
    }

    layer.set_outline_color(black());
    layer.set_outline_thickness(1.0);
    for line in 0..=grid.len() {
        let y = TABLE_TOP - CELL_HEIGHT * line as f32;
        layer.add_line(segment((left, y), (left + table_width, y)));
    }
    for line in 0..=columns {
        let x = left + CELL_WIDTH * line as f32;
        layer.add_line(segment((x, TABLE_TOP), (x, bottom)));
    }

    drop(layer);
    doc.save_to_bytes()
        .map_err(|err| ExportError::Pdf(err.to_string()))
}

fn shade_header(layer: &PdfLayerReference, left: f32, width: f32) {
    let top = TABLE_TOP;
    let bottom = TABLE_TOP - CELL_HEIGHT;
    let ring = [(left, top), (left + width, top), (left + width, bottom), (left, bottom)]
        .into_iter()
        .map(|(x, y)| (Point::new(Mm(x), Mm(y)), false))
        .collect();

    layer.set_fill_color(Color::Greyscale(Greyscale::new(0.5, None)));
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn centred_text(
    layer: &PdfLayerReference,
    text: &str,
    size: f32,
    centre_x: f32,
    baseline: f32,
    font: &IndirectFontRef,
) {
    let width = text.chars().count() as f32 * size * GLYPH_WIDTH_EM * MM_PER_PT;
    layer.use_text(text, size, Mm(centre_x - width / 2.0), Mm(baseline), font);
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}

fn black() -> Color {
    Color::Greyscale(Greyscale::new(0.0, None))
}
