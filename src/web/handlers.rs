//! HTTP handlers for the landing page.

use axum::http::StatusCode;
use axum::response::Html;
use tracing::error;

/// Serve the landing page from the configured static directory.
pub async fn serve_index() -> Result<Html<String>, StatusCode> {
    match tokio::fs::read_to_string("static/index.html").await {
        Ok(content) => Ok(Html(content)),
        Err(e) => {
            error!("Failed to read index.html: {}", e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Serve the built-in landing page when no static files are available.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

/// Built-in landing page: connects to the push channel and shows the
/// latest telemetry line.
const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>airpulse - Air Quality Monitor</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #134e5e 0%, #71b280 100%);
            color: #333;
            min-height: 100vh;
            padding: 20px;
        }

        .container {
            max-width: 760px;
            margin: 0 auto;
        }

        .header {
            text-align: center;
            margin-bottom: 40px;
            color: white;
        }

        .header h1 {
            font-size: 2.5rem;
            margin-bottom: 10px;
            text-shadow: 2px 2px 4px rgba(0,0,0,0.3);
        }

        .card {
            background: white;
            border-radius: 15px;
            padding: 25px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.1);
        }

        .card h3 {
            color: #134e5e;
            margin-bottom: 15px;
        }

        #reading {
            font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
            font-size: 1.05rem;
            line-height: 1.6;
            word-break: break-word;
        }

        .waiting {
            color: #888;
            font-style: italic;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>airpulse</h1>
            <p>Live BME680 air-quality telemetry</p>
        </div>
        <div class="card">
            <h3>Latest reading</h3>
            <div id="reading" class="waiting">Waiting for sensor data...</div>
        </div>
    </div>
    <script>
        const reading = document.getElementById('reading');
        const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
        const socket = new WebSocket(`${scheme}://${location.host}/ws`);

        socket.onmessage = (event) => {
            const update = JSON.parse(event.data);
            if (update.event !== 'sensor_update') {
                return;
            }
            if (update.data === null) {
                reading.className = 'waiting';
                reading.textContent = 'No data this tick';
            } else {
                reading.className = '';
                reading.textContent = update.data;
            }
        };

        socket.onclose = () => {
            reading.className = 'waiting';
            reading.textContent = 'Disconnected';
        };
    </script>
</body>
</html>"#;
