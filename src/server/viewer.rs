//! HTML render surface.
//!
//! The document holds one panel per overlay: a canvas with the base image
//! and the overlay blended at the current opacity, an opacity slider and the
//! class legend. Display buffers are embedded as base64 RGBA bytes; since
//! they are stored bottom-up, the page flips rows back when drawing.
//!
//! Moving a slider only redraws that panel with a new global alpha. When
//! the page is served, the new value is also sent to
//! `PUT /api/overlays/{index}/opacity`.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use crate::error::IoError;
use crate::overlay::{Legend, Visualization};

/// File written by `render` when no output path is given
pub const DEFAULT_OUTPUT: &str = "image_and_segmentation.html";

/// Whether slider moves are reported back to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacitySync {
    /// Standalone file; opacity lives in the page only
    Static,
    /// Served page; every change is PUT to the opacity API
    Server,
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Serialize the buffers and opacities for the page script.
///
/// `<` is escaped so that no string can close the surrounding script tag.
fn script_data(vis: &Visualization, sync: OpacitySync) -> String {
    let (rows, cols) = vis.extent();
    let overlays: Vec<_> = vis
        .overlays()
        .iter()
        .map(|o| {
            json!({
                "name": o.name(),
                "opacity": o.opacity(),
                "buffer": STANDARD.encode(o.buffer().to_rgba_bytes()),
            })
        })
        .collect();

    json!({
        "rows": rows,
        "cols": cols,
        "live": sync == OpacitySync::Server,
        "base": STANDARD.encode(vis.base().to_rgba_bytes()),
        "overlays": overlays,
    })
    .to_string()
    .replace('<', "\\u003c")
}

fn legend_html(legend: &Legend) -> String {
    let cells: String = legend
        .cells
        .iter()
        .map(|cell| {
            let left = cell.x_center as i64 - cell.width as i64 / 2;
            format!(
                r#"<div class="legend-cell" style="left: {left}px; width: {width}px; height: {height}px;"><div class="swatch" style="background: {fill}; opacity: {alpha};"></div><span style="bottom: {text_y}px; color: {text};">{name}</span></div>"#,
                left = left,
                width = cell.width,
                height = cell.height,
                fill = cell.fill,
                alpha = cell.fill_alpha,
                text_y = cell.text_y,
                text = cell.text_color.as_str(),
                name = html_escape(&cell.name),
            )
        })
        .collect();

    format!(
        r#"<div class="legend-title">Classes</div><div class="legend" style="width: {}px; height: {}px;">{}</div>"#,
        legend.width, legend.height, cells
    )
}

fn panel_html(vis: &Visualization, index: usize, title: &str, opacity: f64) -> String {
    let layout = vis.layout();
    format!(
        r#"
    <section class="panel">
        <h2>{title}</h2>
        <canvas id="figure-{index}" width="{width}" height="{height}"></canvas>
        <label class="slider">Opacity
            <input id="opacity-{index}" type="range" min="0" max="1" step="0.01" value="{opacity:.2}">
            <output id="opacity-value-{index}">{opacity:.2}</output>
        </label>
        {legend}
    </section>"#,
        title = html_escape(title),
        index = index,
        width = layout.width,
        height = layout.height,
        opacity = opacity,
        legend = legend_html(vis.legend()),
    )
}

/// Generate the complete HTML document.
pub fn generate_document(vis: &Visualization, sync: OpacitySync) -> String {
    let panels: String = vis
        .overlays()
        .iter()
        .enumerate()
        .map(|(index, overlay)| {
            panel_html(vis, index, &vis.overlay_title(overlay), overlay.opacity())
        })
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image and segmentation - {image_name}</title>
    <style>
        body {{
            background: #fafafa;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 16px;
        }}
        .panels {{
            display: flex;
            flex-direction: row;
            gap: 24px;
            align-items: flex-start;
        }}
        .panel h2 {{
            font-size: 13px;
            font-weight: 600;
            margin: 0 0 8px 0;
        }}
        .panel canvas {{
            display: block;
            border: 1px solid #ddd;
            image-rendering: pixelated;
        }}
        .slider {{
            display: flex;
            gap: 8px;
            align-items: center;
            font-size: 12px;
            margin: 8px 0;
        }}
        .slider input {{
            flex: 1;
        }}
        .legend-title {{
            font-size: 12px;
            font-weight: 600;
            margin-bottom: 4px;
        }}
        .legend {{
            position: relative;
        }}
        .legend-cell {{
            position: absolute;
            bottom: 0;
        }}
        .legend-cell .swatch {{
            position: absolute;
            inset: 0;
            border: 1px solid black;
        }}
        .legend-cell span {{
            position: absolute;
            left: 0;
            right: 0;
            text-align: center;
            font-size: 12px;
        }}
    </style>
</head>
<body>
    <div class="panels">{panels}
    </div>

    <script>
        const DATA = {data};

        function decode(b64) {{
            const binary = atob(b64);
            const bytes = new Uint8ClampedArray(binary.length);
            for (let i = 0; i < binary.length; i++) {{
                bytes[i] = binary.charCodeAt(i);
            }}
            return bytes;
        }}

        // Buffers are stored bottom-up; copy rows back in top-down order
        function toCanvas(bytes, rows, cols) {{
            const canvas = document.createElement('canvas');
            canvas.width = cols;
            canvas.height = rows;
            const ctx = canvas.getContext('2d');
            const image = ctx.createImageData(cols, rows);
            const stride = cols * 4;
            for (let r = 0; r < rows; r++) {{
                const src = (rows - 1 - r) * stride;
                image.data.set(bytes.subarray(src, src + stride), r * stride);
            }}
            ctx.putImageData(image, 0, 0);
            return canvas;
        }}

        const base = toCanvas(decode(DATA.base), DATA.rows, DATA.cols);

        DATA.overlays.forEach(function(overlay, index) {{
            const layer = toCanvas(decode(overlay.buffer), DATA.rows, DATA.cols);
            const figure = document.getElementById('figure-' + index);
            const slider = document.getElementById('opacity-' + index);
            const output = document.getElementById('opacity-value-' + index);
            const ctx = figure.getContext('2d');
            ctx.imageSmoothingEnabled = false;

            function draw(alpha) {{
                ctx.globalAlpha = 1;
                ctx.clearRect(0, 0, figure.width, figure.height);
                ctx.drawImage(base, 0, 0, figure.width, figure.height);
                ctx.globalAlpha = alpha;
                ctx.drawImage(layer, 0, 0, figure.width, figure.height);
                output.textContent = alpha.toFixed(2);
            }}

            draw(overlay.opacity);

            slider.addEventListener('input', function() {{
                const alpha = parseFloat(slider.value);
                draw(alpha);
                if (DATA.live) {{
                    fetch('/api/overlays/' + index + '/opacity', {{
                        method: 'PUT',
                        headers: {{ 'Content-Type': 'application/json' }},
                        body: JSON.stringify({{ opacity: alpha }})
                    }}).catch(function(err) {{
                        console.warn('opacity update failed', err);
                    }});
                }}
            }});
        }});
    </script>
</body>
</html>"##,
        image_name = html_escape(vis.image_name()),
        panels = panels,
        data = script_data(vis, sync),
    )
}

/// Write a standalone document to `path`.
pub fn write_document(vis: &Visualization, path: impl AsRef<Path>) -> Result<(), IoError> {
    let path = path.as_ref();
    std::fs::write(path, generate_document(vis, OpacitySync::Static))
        .map_err(|e| IoError::from_std(&path.display().to_string(), e))
}
