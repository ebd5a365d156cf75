use axum::response::Html;

/// GET / and GET /detect
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"
<!DOCTYPE html>
<html lang="th">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ระบบตรวจจับสิวด้วย AI</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Sarabun', Roboto, sans-serif;
            background: #f4f6fb;
            color: #222;
            padding: 24px;
        }

        .container {
            max-width: 1200px;
            margin: 0 auto;
        }

        h1 {
            font-size: 2.2em;
            margin-bottom: 6px;
        }

        .subtitle {
            color: #666;
            margin-bottom: 28px;
        }

        .grid {
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 24px;
        }

        @media (max-width: 800px) {
            .grid { grid-template-columns: 1fr; }
        }

        .card {
            background: white;
            border-radius: 14px;
            box-shadow: 0 4px 20px rgba(0,0,0,0.06);
            padding: 24px;
        }

        .card h2 {
            font-size: 1.2em;
            margin-bottom: 4px;
        }

        .card .hint {
            color: #888;
            font-size: 0.9em;
            margin-bottom: 18px;
        }

        label {
            display: block;
            font-weight: 600;
            margin: 14px 0 6px;
        }

        input[type="range"] {
            width: 100%;
        }

        .preview {
            margin-top: 16px;
            border-radius: 10px;
            overflow: hidden;
            display: none;
        }

        .preview img {
            width: 100%;
            display: block;
        }

        button {
            margin-top: 18px;
            width: 100%;
            padding: 14px;
            border: none;
            border-radius: 10px;
            background: #4f46e5;
            color: white;
            font-size: 1.05em;
            font-weight: 600;
            cursor: pointer;
        }

        button:disabled {
            background: #a5a3d9;
            cursor: not-allowed;
        }

        .error {
            margin-top: 16px;
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            padding: 12px;
            border-radius: 10px;
            display: none;
        }

        .stats {
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 14px;
            margin-bottom: 14px;
        }

        .stat {
            background: #f4f6fb;
            border-radius: 10px;
            padding: 14px;
        }

        .stat .label {
            color: #888;
            font-size: 0.85em;
        }

        .stat .value {
            font-size: 1.9em;
            font-weight: 700;
        }

        .severity-none { color: #16a34a; }
        .severity-mild { color: #ca8a04; }
        .severity-moderate { color: #ea580c; }
        .severity-severe { color: #dc2626; }

        .rows {
            max-height: 240px;
            overflow-y: auto;
            border: 1px solid #eee;
            border-radius: 10px;
            padding: 10px;
        }

        .row {
            padding: 6px 8px;
            font-size: 0.9em;
            border-bottom: 1px solid #f2f2f2;
        }

        .row small {
            color: #888;
        }

        .placeholder {
            text-align: center;
            color: #999;
            padding: 48px 0;
        }

        .analysis {
            margin-top: 24px;
            display: none;
            white-space: pre-wrap;
            line-height: 1.7;
        }

        .spinner {
            border: 4px solid #eee;
            border-top: 4px solid #4f46e5;
            border-radius: 50%;
            width: 36px;
            height: 36px;
            animation: spin 1s linear infinite;
            margin: 24px auto;
        }

        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>ระบบตรวจจับสิวด้วย AI</h1>
        <p class="subtitle">อัพโหลดภาพใบหน้าเพื่อให้ระบบ YOLOv7 ตรวจจับสิวและรับคำแนะนำจาก AI</p>

        <div class="grid">
            <div class="card">
                <h2>อัพโหลดรูปภาพ</h2>
                <p class="hint">เลือกรูปภาพใบหน้าเพื่อตรวจจับสิว</p>

                <label for="fileInput">รูปภาพ</label>
                <input type="file" id="fileInput" accept="image/*">

                <label for="confidence">ความมั่นใจขั้นต่ำ: <span id="confidenceLabel">25</span>%</label>
                <input type="range" id="confidence" min="0.1" max="0.9" step="0.05" value="0.25">

                <div class="preview" id="preview"><img id="previewImage" alt="Preview"></div>

                <button id="detectButton" disabled>ตรวจจับสิว</button>
                <div class="error" id="error"></div>
            </div>

            <div class="card">
                <h2>ผลการตรวจจับ</h2>
                <p class="hint">รายละเอียดและสถิติการตรวจจับสิว</p>
                <div id="results">
                    <div class="placeholder">อัพโหลดและตรวจจับรูปภาพเพื่อดูผลลัพธ์</div>
                </div>
            </div>
        </div>

        <div class="card analysis" id="analysisCard">
            <h2>การวิเคราะห์จาก AI</h2>
            <p class="hint">คำแนะนำและข้อเสนอแนะในการดูแลผิวจากระบบ AI</p>
            <div id="analysisBody"></div>
        </div>
    </div>

    <script>
        const SEVERITY_TEXT = { none: 'ไม่พบสิว', mild: 'เล็กน้อย', moderate: 'ปานกลาง', severe: 'มาก' };

        const state = {
            file: null,
            previewUrl: '',
            threshold: 0.25,
            isDetecting: false,
            isAnalyzing: false,
            detectionResult: null,
            analysisResult: null,
            error: '',
        };

        const $ = (id) => document.getElementById(id);

        function update(changes) {
            Object.assign(state, changes);
            render();
        }

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }

        function render() {
            $('fileInput').disabled = state.isDetecting;
            $('confidence').disabled = state.isDetecting;
            $('confidenceLabel').textContent = (state.threshold * 100).toFixed(0);
            $('detectButton').disabled = !state.file || state.isDetecting;
            $('detectButton').textContent = state.isDetecting ? 'กำลังตรวจจับ...' : 'ตรวจจับสิว';

            $('preview').style.display = state.previewUrl ? 'block' : 'none';
            $('previewImage').src = state.previewUrl;

            $('error').style.display = state.error ? 'block' : 'none';
            $('error').textContent = state.error;

            const results = $('results');
            if (state.isDetecting && !state.detectionResult) {
                results.innerHTML = '<div class="spinner"></div>';
            } else if (state.detectionResult) {
                const r = state.detectionResult;
                const severity = state.analysisResult ? state.analysisResult.detection_summary.severity : null;
                const rows = r.detections.map((det, idx) => `
                    <div class="row">
                        <strong>#${idx + 1} ${escapeHtml(det.class_name)}</strong>
                        ${(det.confidence * 100).toFixed(1)}%<br>
                        <small>ตำแหน่ง: (${Math.round(det.bbox.x)}, ${Math.round(det.bbox.y)})</small>
                    </div>`).join('');
                results.innerHTML = `
                    <div class="stats">
                        <div class="stat"><div class="label">จำนวนสิว</div><div class="value">${r.detections_count}</div></div>
                        <div class="stat"><div class="label">ความรุนแรง</div>
                            <div class="value ${severity ? 'severity-' + severity : ''}">${severity ? SEVERITY_TEXT[severity] : '-'}</div></div>
                    </div>
                    <div class="stat" style="margin-bottom:14px">
                        <div class="label">โมเดล</div>
                        <div>${escapeHtml(r.model_info.name)}</div>
                        <small>${escapeHtml(r.model_info.version)}</small>
                    </div>
                    ${r.detections.length > 0 ? `<div class="rows"><div>รายละเอียดการตรวจจับ:</div>${rows}</div>` : ''}`;
            } else {
                results.innerHTML = '<div class="placeholder">อัพโหลดและตรวจจับรูปภาพเพื่อดูผลลัพธ์</div>';
            }

            const showAnalysis = state.isAnalyzing || state.analysisResult;
            $('analysisCard').style.display = showAnalysis ? 'block' : 'none';
            if (state.isAnalyzing) {
                $('analysisBody').innerHTML = '<div class="spinner"></div>';
            } else if (state.analysisResult) {
                $('analysisBody').textContent = state.analysisResult.analysis;
            }
        }

        $('fileInput').addEventListener('change', (e) => {
            const file = e.target.files[0];
            if (!file) return;
            if (!file.type.startsWith('image/')) {
                update({ error: 'กรุณาเลือกไฟล์รูปภาพ' });
                return;
            }
            update({
                file,
                previewUrl: URL.createObjectURL(file),
                error: '',
                detectionResult: null,
                analysisResult: null,
            });
        });

        $('confidence').addEventListener('input', (e) => {
            update({ threshold: parseFloat(e.target.value) });
        });

        async function analyze(result) {
            update({ isAnalyzing: true });
            try {
                const response = await fetch('/api/analyze-acne', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        detections: result.detections,
                        detections_count: result.detections_count,
                        image_size: result.image_size,
                        model: 'gemini-pro',
                    }),
                });
                if (!response.ok) throw new Error('การวิเคราะห์ล้มเหลว');
                update({ analysisResult: await response.json() });
            } catch (err) {
                update({ error: err.message || 'เกิดข้อผิดพลาดในการวิเคราะห์' });
            } finally {
                update({ isAnalyzing: false });
            }
        }

        $('detectButton').addEventListener('click', async () => {
            if (!state.file) {
                update({ error: 'กรุณาเลือกรูปภาพก่อน' });
                return;
            }
            update({ isDetecting: true, error: '' });
            try {
                const formData = new FormData();
                formData.append('file', state.file);
                formData.append('confidence_threshold', state.threshold.toString());

                const response = await fetch('/api/detect-acne', { method: 'POST', body: formData });
                if (!response.ok) throw new Error('การตรวจจับล้มเหลว');

                const result = await response.json();
                update({ detectionResult: result });
                await analyze(result);
            } catch (err) {
                update({ error: err.message || 'เกิดข้อผิดพลาด' });
            } finally {
                update({ isDetecting: false });
            }
        });

        render();
    </script>
</body>
</html>
"#;
