use crate::models::DEFAULT_CATEGORIES;
use crate::stats::RECENT_LIMIT;

pub fn render_index() -> String {
    INDEX_HTML
        .replace("{{DEFAULT_CATEGORIES}}", &DEFAULT_CATEGORIES.join("・"))
        .replace("{{RECENT_LIMIT}}", &RECENT_LIMIT.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>学習ログ</title>
  <style>
    :root {
      --bg: #f6f5f2;
      --ink: #23262b;
      --muted: #7a7f87;
      --card: #ffffff;
      --border: rgba(35, 38, 43, 0.1);
      --accent: #2563eb;
      --danger: #dc2626;
      --heat-0: #ebedf0;
      --heat-1: #bbf7d0;
      --heat-2: #86efac;
      --heat-3: #22c55e;
      --heat-4: #15803d;
      --shadow: 0 18px 40px rgba(35, 38, 43, 0.08);
    }

    html.dark {
      --bg: #15171b;
      --ink: #eceef1;
      --muted: #9aa0a8;
      --card: #1f2227;
      --border: rgba(236, 238, 241, 0.12);
      --heat-0: #2a2e35;
      --heat-1: #14532d;
      --heat-2: #15803d;
      --heat-3: #16a34a;
      --heat-4: #22c55e;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Hiragino Sans", "Noto Sans JP", system-ui, sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1120px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    h2 {
      margin: 0 0 4px;
      font-size: 1.1rem;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat .label {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      margin: 6px 0 2px;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(340px, 1fr));
      gap: 24px;
    }

    .heatmap {
      display: inline-flex;
      gap: 3px;
      overflow-x: auto;
      max-width: 100%;
    }

    .heatmap .week {
      display: flex;
      flex-direction: column;
      gap: 3px;
    }

    .heatmap .cell {
      width: 12px;
      height: 12px;
      border-radius: 3px;
      background: var(--heat-0);
    }

    .cell.l1 { background: var(--heat-1); }
    .cell.l2 { background: var(--heat-2); }
    .cell.l3 { background: var(--heat-3); }
    .cell.l4 { background: var(--heat-4); }

    .legend {
      display: flex;
      align-items: center;
      gap: 4px;
      margin-top: 12px;
      font-size: 0.8rem;
      color: var(--muted);
    }

    .legend .cell {
      width: 12px;
      height: 12px;
      border-radius: 3px;
    }

    .chart-legend {
      list-style: none;
      padding: 0;
      margin: 12px 0 0;
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
    }

    .chart-legend .swatch {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 8px;
    }

    .log-list {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .log-item {
      display: flex;
      gap: 12px;
      align-items: flex-start;
      padding: 12px;
      border: 1px solid var(--border);
      border-radius: 12px;
    }

    .log-item .body {
      flex: 1;
      min-width: 0;
    }

    .log-item .meta {
      font-size: 0.85rem;
      color: var(--muted);
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .badge {
      padding: 2px 8px;
      border-radius: 999px;
      background: rgba(37, 99, 235, 0.12);
      color: var(--accent);
      font-size: 0.75rem;
    }

    .log-item .note {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.9rem;
      white-space: pre-wrap;
      overflow-wrap: anywhere;
    }

    button {
      border: 1px solid var(--border);
      background: var(--card);
      color: var(--ink);
      border-radius: 10px;
      padding: 8px 14px;
      font: inherit;
      cursor: pointer;
    }

    button.primary {
      background: var(--accent);
      border-color: var(--accent);
      color: #fff;
    }

    button.danger {
      color: var(--danger);
    }

    input, select, textarea {
      width: 100%;
      padding: 8px 10px;
      border: 1px solid var(--border);
      border-radius: 10px;
      background: var(--card);
      color: var(--ink);
      font: inherit;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
    }

    form {
      display: grid;
      gap: 14px;
    }

    .row {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    dialog {
      border: none;
      border-radius: 16px;
      padding: 24px;
      width: min(440px, 92vw);
      background: var(--card);
      color: var(--ink);
    }

    dialog::backdrop {
      background: rgba(0, 0, 0, 0.35);
    }

    .auth {
      width: min(420px, 100%);
      margin: 10vh auto 0;
    }

    .tabs {
      display: flex;
      gap: 8px;
      margin-bottom: 16px;
    }

    .tab.active {
      background: var(--accent);
      border-color: var(--accent);
      color: #fff;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    .empty {
      text-align: center;
      color: var(--muted);
      padding: 32px 0;
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <section id="auth-view" class="auth card" hidden>
    <h1>学習ログ</h1>
    <p class="subtitle">学習時間を記録して、成長を可視化しましょう</p>
    <div class="tabs" role="tablist" style="margin-top: 16px">
      <button class="tab active" type="button" data-auth="login">ログイン</button>
      <button class="tab" type="button" data-auth="signup">新規登録</button>
    </div>
    <form id="auth-form">
      <label id="name-field" hidden>名前
        <input id="auth-name" type="text" autocomplete="name" />
      </label>
      <label>メールアドレス
        <input id="auth-email" type="email" autocomplete="email" required />
      </label>
      <label>パスワード
        <input id="auth-password" type="password" autocomplete="current-password" required />
      </label>
      <p id="signup-hint" class="subtitle" hidden>初期カテゴリ: {{DEFAULT_CATEGORIES}}</p>
      <button class="primary" type="submit" id="auth-submit">ログイン</button>
    </form>
    <div class="status" id="auth-status"></div>
  </section>

  <main id="dashboard" class="app" hidden>
    <header>
      <div>
        <h1>ようこそ、<span id="user-name">ユーザー</span>さん</h1>
        <p class="subtitle">今日も学習を記録しましょう</p>
      </div>
      <div class="row">
        <button type="button" id="theme-btn" aria-label="テーマ切替">🌙</button>
        <button type="button" id="settings-btn">設定</button>
        <button type="button" id="logout-btn">ログアウト</button>
      </div>
    </header>

    <section class="cards">
      <div class="card stat">
        <div class="label">総学習時間</div>
        <div class="value" id="total">0分</div>
        <div class="subtitle">累計の学習時間</div>
      </div>
      <div class="card stat">
        <div class="label">今週の学習</div>
        <div class="value" id="week">0分</div>
        <div class="subtitle">月曜日からの学習時間</div>
      </div>
      <div class="card stat">
        <div class="label">連続学習日数</div>
        <div class="value" id="streak">0日</div>
        <div class="subtitle">継続は力なり</div>
      </div>
      <div class="card stat">
        <div class="label">学習日数</div>
        <div class="value" id="days">0日</div>
        <div class="subtitle">総学習日数</div>
      </div>
    </section>

    <section class="card">
      <h2>学習カレンダー</h2>
      <p class="subtitle">過去1年間の学習記録</p>
      <div class="heatmap" id="heatmap" style="margin-top: 12px"></div>
      <div class="legend">
        <span>少</span>
        <span class="cell" style="background: var(--heat-0)"></span>
        <span class="cell" style="background: var(--heat-1)"></span>
        <span class="cell" style="background: var(--heat-2)"></span>
        <span class="cell" style="background: var(--heat-3)"></span>
        <span class="cell" style="background: var(--heat-4)"></span>
        <span>多</span>
      </div>
    </section>

    <section class="columns">
      <div class="card">
        <h2>カテゴリ別学習時間</h2>
        <p class="subtitle">学習時間の割合</p>
        <div id="pie"></div>
      </div>
      <div class="card">
        <div class="row" style="justify-content: space-between">
          <div>
            <h2>学習ログ</h2>
            <p class="subtitle">最近の学習記録 ({{RECENT_LIMIT}}件)</p>
          </div>
          <button class="primary" type="button" id="add-btn">ログを追加</button>
        </div>
        <ul class="log-list" id="log-list" style="margin-top: 12px"></ul>
      </div>
    </section>
    <div class="status" id="status"></div>
  </main>

  <dialog id="log-dialog">
    <form id="log-form" method="dialog">
      <h2 id="log-dialog-title">学習ログを追加</h2>
      <label>日付
        <input id="log-date" type="date" required />
      </label>
      <label>カテゴリ
        <select id="log-category" required></select>
      </label>
      <label>学習時間
        <div class="row">
          <input id="log-hours" type="number" min="0" max="24" placeholder="時間" />
          <span>時間</span>
          <input id="log-minutes" type="number" min="0" max="59" placeholder="分" />
          <span>分</span>
        </div>
      </label>
      <label>学習内容（メモ）
        <textarea id="log-content" rows="4" placeholder="今日学んだことを記録しましょう..."></textarea>
      </label>
      <div class="row">
        <button type="button" id="log-cancel" style="flex: 1">キャンセル</button>
        <button class="primary" type="submit" id="log-submit" style="flex: 1">追加</button>
      </div>
    </form>
  </dialog>

  <dialog id="settings-dialog">
    <h2>設定</h2>
    <p class="subtitle">カテゴリの管理</p>
    <div class="row" style="margin: 12px 0">
      <input id="new-category" placeholder="新しいカテゴリ" />
      <button type="button" id="add-category">追加</button>
    </div>
    <ul class="log-list" id="category-list"></ul>
    <div class="row" style="margin-top: 16px">
      <button type="button" id="settings-cancel" style="flex: 1">キャンセル</button>
      <button class="primary" type="button" id="settings-save" style="flex: 1">保存</button>
    </div>
  </dialog>

  <script>
    const TOKEN_KEY = 'study-log-token';
    const $ = (id) => document.getElementById(id);
    let token = localStorage.getItem(TOKEN_KEY);
    let categories = [];
    let logs = [];
    let editingId = null;
    let draftCategories = [];
    let authMode = 'login';

    const setStatus = (el, message, type) => {
      el.textContent = message;
      el.dataset.type = type || '';
    };

    const localDate = (date = new Date()) => {
      const pad = (n) => String(n).padStart(2, '0');
      return `${date.getFullYear()}-${pad(date.getMonth() + 1)}-${pad(date.getDate())}`;
    };

    const formatDuration = (minutes) => {
      const hours = Math.floor(minutes / 60);
      const mins = minutes % 60;
      if (hours === 0) return `${mins}分`;
      if (mins === 0) return `${hours}時間`;
      return `${hours}時間${mins}分`;
    };

    const formatLogDate = (value) => {
      const [y, m, d] = value.split('-').map(Number);
      const date = new Date(y, m - 1, d);
      const weekdays = ['日', '月', '火', '水', '木', '金', '土'];
      return `${m}/${d} (${weekdays[date.getDay()]})`;
    };

    const api = async (path, options = {}) => {
      const headers = { ...(options.headers || {}) };
      if (token) headers.Authorization = `Bearer ${token}`;
      if (options.body !== undefined) headers['content-type'] = 'application/json';
      const res = await fetch(`/api${path}`, {
        ...options,
        headers,
        body: options.body === undefined ? undefined : JSON.stringify(options.body)
      });
      const data = await res.json().catch(() => ({}));
      if (res.status === 401 && token) {
        logout();
      }
      if (!res.ok) {
        throw new Error(data.error || 'リクエストに失敗しました');
      }
      return data;
    };

    const showAuth = () => {
      $('dashboard').hidden = true;
      $('auth-view').hidden = false;
    };

    const showDashboard = () => {
      $('auth-view').hidden = true;
      $('dashboard').hidden = false;
    };

    const logout = () => {
      token = null;
      localStorage.removeItem(TOKEN_KEY);
      showAuth();
    };

    const setAuthMode = (mode) => {
      authMode = mode;
      document.querySelectorAll('[data-auth]').forEach((btn) => {
        btn.classList.toggle('active', btn.dataset.auth === mode);
      });
      $('name-field').hidden = mode !== 'signup';
      $('signup-hint').hidden = mode !== 'signup';
      $('auth-submit').textContent = mode === 'signup' ? '登録' : 'ログイン';
      setStatus($('auth-status'), '', '');
    };

    const signIn = async (email, password) => {
      const data = await api('/login', { method: 'POST', body: { email, password } });
      token = data.accessToken;
      localStorage.setItem(TOKEN_KEY, token);
    };

    $('auth-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const email = $('auth-email').value;
      const password = $('auth-password').value;
      try {
        if (authMode === 'signup') {
          await api('/signup', { method: 'POST', body: { email, password, name: $('auth-name').value } });
        }
        await signIn(email, password);
        showDashboard();
        await loadAll();
      } catch (err) {
        setStatus($('auth-status'), err.message, 'error');
      }
    });

    const renderHeatmap = (weeks) => {
      const root = $('heatmap');
      root.innerHTML = '';
      weeks.forEach((week) => {
        const column = document.createElement('div');
        column.className = 'week';
        week.forEach((day) => {
          const cell = document.createElement('div');
          cell.className = `cell l${day.level}`;
          cell.title = `${day.date.replaceAll('-', '/')}: ${day.minutes > 0 ? formatDuration(day.minutes) : '学習記録なし'}`;
          column.appendChild(cell);
        });
        root.appendChild(column);
      });
    };

    const renderPie = (slices) => {
      const root = $('pie');
      if (!slices.length) {
        root.innerHTML = '<div class="empty">学習ログがまだありません</div>';
        return;
      }
      const total = slices.reduce((sum, s) => sum + s.minutes, 0);
      const cx = 110;
      const cy = 110;
      const r = 90;
      let angle = -Math.PI / 2;
      let paths = '';
      if (slices.length === 1) {
        paths = `<circle cx="${cx}" cy="${cy}" r="${r}" fill="${slices[0].color}" />`;
      } else {
        slices.forEach((slice) => {
          const sweep = (slice.minutes / total) * Math.PI * 2;
          const x1 = cx + r * Math.cos(angle);
          const y1 = cy + r * Math.sin(angle);
          angle += sweep;
          const x2 = cx + r * Math.cos(angle);
          const y2 = cy + r * Math.sin(angle);
          const large = sweep > Math.PI ? 1 : 0;
          paths += `<path d="M ${cx} ${cy} L ${x1.toFixed(2)} ${y1.toFixed(2)} A ${r} ${r} 0 ${large} 1 ${x2.toFixed(2)} ${y2.toFixed(2)} Z" fill="${slice.color}" />`;
        });
      }
      root.innerHTML = `<svg viewBox="0 0 220 220" width="220" height="220" role="img">${paths}</svg>`;
      const legend = document.createElement('ul');
      legend.className = 'chart-legend';
      slices.forEach((slice) => {
        const item = document.createElement('li');
        const swatch = document.createElement('span');
        swatch.className = 'swatch';
        swatch.style.background = slice.color;
        item.appendChild(swatch);
        item.appendChild(document.createTextNode(`${slice.name} ${slice.percent}% (${formatDuration(slice.minutes)})`));
        legend.appendChild(item);
      });
      root.appendChild(legend);
    };

    const renderLogs = (recent) => {
      const list = $('log-list');
      list.innerHTML = '';
      if (!recent.length) {
        list.innerHTML = '<li class="empty">学習ログがまだありません</li>';
        return;
      }
      recent.forEach((log) => {
        const item = document.createElement('li');
        item.className = 'log-item';
        const body = document.createElement('div');
        body.className = 'body';
        const meta = document.createElement('div');
        meta.className = 'meta';
        meta.textContent = formatLogDate(log.date);
        const badge = document.createElement('span');
        badge.className = 'badge';
        badge.textContent = log.category;
        meta.appendChild(badge);
        const duration = document.createElement('div');
        duration.textContent = formatDuration(log.duration);
        body.append(meta, duration);
        if (log.content) {
          const note = document.createElement('p');
          note.className = 'note';
          note.textContent = log.content;
          body.appendChild(note);
        }
        const edit = document.createElement('button');
        edit.type = 'button';
        edit.textContent = '編集';
        edit.addEventListener('click', () => openLogDialog(log));
        const remove = document.createElement('button');
        remove.type = 'button';
        remove.className = 'danger';
        remove.textContent = '削除';
        remove.addEventListener('click', () => deleteLog(log.id));
        item.append(body, edit, remove);
        list.appendChild(item);
      });
    };

    const loadStats = async () => {
      const stats = await api(`/stats?today=${localDate()}`);
      $('total').textContent = stats.summary.totalLabel;
      $('week').textContent = stats.summary.weekLabel;
      $('streak').textContent = `${stats.summary.consecutiveDays}日`;
      $('days').textContent = `${stats.summary.studyDays}日`;
      renderHeatmap(stats.heatmap);
      renderPie(stats.categories);
      renderLogs(stats.recent);
    };

    const loadAll = async () => {
      try {
        const [user, cats] = await Promise.all([api('/user'), api('/categories')]);
        $('user-name').textContent = user.user.name || 'ユーザー';
        categories = cats.categories || [];
        const data = await api('/logs');
        logs = data.logs || [];
        await loadStats();
      } catch (err) {
        setStatus($('status'), err.message, 'error');
      }
    };

    const fillCategoryOptions = (selected) => {
      const select = $('log-category');
      select.innerHTML = '<option value="">カテゴリを選択</option>';
      categories.forEach((name) => {
        const option = document.createElement('option');
        option.value = name;
        option.textContent = name;
        option.selected = name === selected;
        select.appendChild(option);
      });
    };

    const openLogDialog = (log) => {
      editingId = log ? log.id : null;
      $('log-dialog-title').textContent = log ? '学習ログを編集' : '学習ログを追加';
      $('log-submit').textContent = log ? '更新' : '追加';
      $('log-date').value = log ? log.date : localDate();
      fillCategoryOptions(log ? log.category : '');
      $('log-hours').value = log ? Math.floor(log.duration / 60) : '';
      $('log-minutes').value = log ? log.duration % 60 : '';
      $('log-content').value = log ? log.content : '';
      $('log-dialog').showModal();
    };

    $('log-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const body = {
        date: $('log-date').value,
        category: $('log-category').value,
        hours: parseInt($('log-hours').value, 10) || 0,
        minutes: parseInt($('log-minutes').value, 10) || 0,
        content: $('log-content').value
      };
      try {
        if (editingId) {
          await api(`/logs/${editingId}`, { method: 'PUT', body });
        } else {
          await api('/logs', { method: 'POST', body });
        }
        $('log-dialog').close();
        await loadAll();
      } catch (err) {
        setStatus($('status'), err.message, 'error');
      }
    });

    const deleteLog = async (id) => {
      if (!confirm('この学習ログを削除しますか？')) return;
      try {
        await api(`/logs/${id}`, { method: 'DELETE' });
        await loadAll();
      } catch (err) {
        setStatus($('status'), err.message, 'error');
      }
    };

    const renderCategoryList = () => {
      const list = $('category-list');
      list.innerHTML = '';
      if (!draftCategories.length) {
        list.innerHTML = '<li class="empty">カテゴリがありません</li>';
        return;
      }
      draftCategories.forEach((name, index) => {
        const item = document.createElement('li');
        item.className = 'log-item';
        const label = document.createElement('span');
        label.className = 'body';
        label.textContent = name;
        const rename = document.createElement('button');
        rename.type = 'button';
        rename.textContent = '編集';
        rename.addEventListener('click', () => {
          const next = (prompt('カテゴリ名', name) || '').trim();
          if (next && !draftCategories.includes(next)) {
            draftCategories[index] = next;
            renderCategoryList();
          }
        });
        const remove = document.createElement('button');
        remove.type = 'button';
        remove.className = 'danger';
        remove.textContent = '削除';
        remove.addEventListener('click', () => {
          draftCategories.splice(index, 1);
          renderCategoryList();
        });
        item.append(label, rename, remove);
        list.appendChild(item);
      });
    };

    const addDraftCategory = () => {
      const input = $('new-category');
      const name = input.value.trim();
      if (name && !draftCategories.includes(name)) {
        draftCategories.push(name);
        input.value = '';
        renderCategoryList();
      }
    };

    $('add-category').addEventListener('click', addDraftCategory);
    $('new-category').addEventListener('keydown', (event) => {
      if (event.key === 'Enter') addDraftCategory();
    });
    $('settings-btn').addEventListener('click', () => {
      draftCategories = [...categories];
      renderCategoryList();
      $('settings-dialog').showModal();
    });
    $('settings-cancel').addEventListener('click', () => $('settings-dialog').close());
    $('settings-save').addEventListener('click', async () => {
      try {
        await api('/categories', { method: 'PUT', body: { categories: draftCategories } });
        categories = [...draftCategories];
        $('settings-dialog').close();
      } catch (err) {
        setStatus($('status'), err.message, 'error');
      }
    });

    $('add-btn').addEventListener('click', () => openLogDialog(null));
    $('log-cancel').addEventListener('click', () => $('log-dialog').close());
    $('logout-btn').addEventListener('click', logout);
    document.querySelectorAll('[data-auth]').forEach((btn) => {
      btn.addEventListener('click', () => setAuthMode(btn.dataset.auth));
    });

    const applyTheme = (dark) => {
      document.documentElement.classList.toggle('dark', dark);
      $('theme-btn').textContent = dark ? '☀️' : '🌙';
      localStorage.setItem('study-log-theme', dark ? 'dark' : 'light');
    };
    $('theme-btn').addEventListener('click', () => {
      applyTheme(!document.documentElement.classList.contains('dark'));
    });
    applyTheme(localStorage.getItem('study-log-theme') === 'dark');

    if (token) {
      showDashboard();
      loadAll();
    } else {
      showAuth();
    }
  </script>
</body>
</html>
"#;
