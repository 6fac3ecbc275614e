use crate::core::BrowserTrait;
use crate::errors::Result;
use crate::resolver::scope::Scope;
use serde::Deserialize;
use serde_json::Value;

/// Borrowed view over one tab through which all DOM interaction flows.
///
/// Every query and action is expressed as an evaluated script, so the driver
/// works against any `BrowserTrait` implementation. Resolved elements are
/// tagged in-page with a `data-bp-hit` attribute; subsequent actions address
/// the tag rather than re-running the original strategy, which keeps the
/// resolve and act steps from racing page re-renders.
pub struct PageDriver<'a, B: BrowserTrait> {
    browser: &'a B,
    tab: &'a B::TabHandle,
}

/// Result of probing a selector inside a scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementProbe {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub text: Option<String>,
}

impl ElementProbe {
    pub fn usable(&self) -> bool {
        self.found && self.visible && self.enabled
    }
}

/// One interactive element harvested for fuzzy scoring.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateElement {
    pub order: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub context_text: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub class_signature: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub enabled: bool,
}

fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Shared JS prelude: `__scope` bound to the requested sub-tree (or the
/// document), plus visibility/enabled helpers.
fn scope_prelude(scope: &Scope) -> String {
    let helpers = r#"
        const __visible = (el) => {
            if (!el) return false;
            const r = el.getBoundingClientRect();
            const s = window.getComputedStyle(el);
            return r.width > 0 && r.height > 0 && s.display !== 'none' && s.visibility !== 'hidden';
        };
        const __enabled = (el) => {
            if (!el) return false;
            if (el.disabled === true) return false;
            return el.getAttribute('aria-disabled') !== 'true';
        };
    "#;
    match &scope.card_selector {
        Some(card) => {
            let idx = scope.index.unwrap_or(1);
            format!(
                r#"{helpers}
                const __cards = document.querySelectorAll({card});
                let __scope = document;
                if (__cards.length > 0) {{
                    const __i = {idx};
                    __scope = (__i >= 1 && __i <= __cards.length) ? __cards[__i - 1] : __cards[0];
                }}
                "#,
                helpers = helpers,
                card = js_str(card),
                idx = idx,
            )
        }
        None => format!("{}\nconst __scope = document;", helpers),
    }
}

impl<'a, B: BrowserTrait> PageDriver<'a, B> {
    pub fn new(browser: &'a B, tab: &'a B::TabHandle) -> Self {
        Self { browser, tab }
    }

    pub async fn eval(&self, script: &str) -> Result<Value> {
        self.browser.execute_script(self.tab, script).await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.browser.get_url(self.tab).await
    }

    pub async fn title(&self) -> Result<String> {
        self.browser.get_title(self.tab).await
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.browser.navigate(self.tab, url).await
    }

    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.browser.take_screenshot(self.tab).await
    }

    pub async fn page_html(&self) -> Result<String> {
        let v = self.eval("document.documentElement.outerHTML").await?;
        Ok(v.as_str().unwrap_or("").to_string())
    }

    pub async fn page_text(&self) -> Result<String> {
        let v = self
            .eval("(document.body && document.body.innerText) || ''")
            .await?;
        Ok(v.as_str().unwrap_or("").to_string())
    }

    /// Probe the first match of `selector` inside `scope` without touching it.
    pub async fn probe(&self, scope: &Scope, selector: &str) -> Result<ElementProbe> {
        let script = format!(
            r#"(function() {{
                {prelude}
                let el = null;
                try {{ el = __scope.querySelector({sel}); }} catch (e) {{ return {{ found: false }}; }}
                if (!el) return {{ found: false }};
                return {{
                    found: true,
                    visible: __visible(el),
                    enabled: __enabled(el),
                    text: (el.textContent || '').trim().slice(0, 200)
                }};
            }})()"#,
            prelude = scope_prelude(scope),
            sel = js_str(selector),
        );
        let v = self.eval(&script).await?;
        Ok(serde_json::from_value(v).unwrap_or_default())
    }

    /// Number of elements matching `selector` on the whole page.
    pub async fn count(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "(function() {{ try {{ return document.querySelectorAll({}).length; }} catch (e) {{ return 0; }} }})()",
            js_str(selector)
        );
        let v = self.eval(&script).await?;
        Ok(v.as_u64().unwrap_or(0) as usize)
    }

    /// Find the first visible+enabled match of `selector` inside `scope` and
    /// tag it for later actions. Returns false when nothing usable matched.
    pub async fn tag_match(&self, scope: &Scope, selector: &str, token: &str) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                {prelude}
                let nodes = [];
                try {{ nodes = __scope.querySelectorAll({sel}); }} catch (e) {{ return false; }}
                for (const el of nodes) {{
                    if (__visible(el) && __enabled(el)) {{
                        el.setAttribute('data-bp-hit', {tok});
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            prelude = scope_prelude(scope),
            sel = js_str(selector),
            tok = js_str(token),
        );
        let v = self.eval(&script).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    /// Tag the first visible+enabled element matching `role_selector` whose
    /// text contains any of `include` (case-insensitive) and none of
    /// `exclude`.
    pub async fn tag_by_text(
        &self,
        scope: &Scope,
        role_selector: &str,
        include: &[String],
        exclude: &[String],
        token: &str,
    ) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                {prelude}
                const include = {include};
                const exclude = {exclude};
                let nodes = [];
                try {{ nodes = __scope.querySelectorAll({sel}); }} catch (e) {{ return false; }}
                for (const el of nodes) {{
                    if (!__visible(el) || !__enabled(el)) continue;
                    const text = (el.textContent || '').toLowerCase();
                    if (exclude.some(w => text.includes(w))) continue;
                    if (include.length === 0 || include.some(w => w && text.includes(w))) {{
                        el.setAttribute('data-bp-hit', {tok});
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            prelude = scope_prelude(scope),
            include = serde_json::to_string(
                &include.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>()
            )?,
            exclude = serde_json::to_string(
                &exclude.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>()
            )?,
            sel = js_str(role_selector),
            tok = js_str(token),
        );
        let v = self.eval(&script).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    /// Positional strategy: within `scope`, take the `index`-th (1-based)
    /// container matching `container_selector` and tag its first
    /// visible+enabled `target_selector` match.
    pub async fn tag_nth_container(
        &self,
        scope: &Scope,
        container_selector: &str,
        index: usize,
        target_selector: &str,
        exclude: &[String],
        token: &str,
    ) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                {prelude}
                const exclude = {exclude};
                let containers = [];
                try {{ containers = __scope.querySelectorAll({container}); }} catch (e) {{ return false; }}
                const i = {idx};
                if (i < 1 || i > containers.length) return false;
                const container = containers[i - 1];
                let nodes = [];
                try {{ nodes = container.querySelectorAll({target}); }} catch (e) {{ return false; }}
                for (const el of nodes) {{
                    if (!__visible(el) || !__enabled(el)) continue;
                    const text = (el.textContent || '').toLowerCase();
                    if (exclude.some(w => text.includes(w))) continue;
                    el.setAttribute('data-bp-hit', {tok});
                    return true;
                }}
                return false;
            }})()"#,
            prelude = scope_prelude(scope),
            exclude = serde_json::to_string(
                &exclude.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>()
            )?,
            container = js_str(container_selector),
            idx = index,
            target = js_str(target_selector),
            tok = js_str(token),
        );
        let v = self.eval(&script).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    /// Collect interactive candidates inside `scope` for fuzzy scoring.
    pub async fn harvest_candidates(
        &self,
        scope: &Scope,
        role_selector: &str,
    ) -> Result<Vec<CandidateElement>> {
        let script = format!(
            r#"(function() {{
                {prelude}
                const out = [];
                let nodes = [];
                try {{ nodes = __scope.querySelectorAll({sel}); }} catch (e) {{ return out; }}
                nodes.forEach((el, idx) => {{
                    const ctx = el.closest('div,li,article,section,tr') || el;
                    const cls = (typeof el.className === 'string' ? el.className : '').trim();
                    out.push({{
                        order: idx,
                        text: (el.textContent || '').trim().slice(0, 200),
                        contextText: (ctx.textContent || '').trim().slice(0, 400),
                        tag: el.tagName.toLowerCase(),
                        classSignature: el.tagName.toLowerCase() + '.' + cls.split(/\s+/).sort().join('.'),
                        visible: __visible(el),
                        enabled: __enabled(el)
                    }});
                }});
                return out;
            }})()"#,
            prelude = scope_prelude(scope),
            sel = js_str(role_selector),
        );
        let v = self.eval(&script).await?;
        Ok(serde_json::from_value(v).unwrap_or_default())
    }

    /// Tag the candidate at `order` within the same harvest ordering.
    pub async fn tag_candidate(
        &self,
        scope: &Scope,
        role_selector: &str,
        order: usize,
        token: &str,
    ) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                {prelude}
                let nodes = [];
                try {{ nodes = __scope.querySelectorAll({sel}); }} catch (e) {{ return false; }}
                if ({order} >= nodes.length) return false;
                nodes[{order}].setAttribute('data-bp-hit', {tok});
                return true;
            }})()"#,
            prelude = scope_prelude(scope),
            sel = js_str(role_selector),
            order = order,
            tok = js_str(token),
        );
        let v = self.eval(&script).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn tagged(token: &str) -> String {
        format!("[data-bp-hit={}]", serde_json::to_string(token).unwrap_or_default())
    }

    /// Best-effort scroll of a tagged element into view.
    pub async fn scroll_tagged_into_view(&self, token: &str) {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (el) el.scrollIntoView({{ block: 'center' }});
                return true;
            }})()"#,
            sel = js_str(&Self::tagged(token)),
        );
        let _ = self.eval(&script).await;
    }

    pub async fn click_tagged(&self, token: &str) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (!el) return {{ success: false, error: 'Element not found' }};
                try {{
                    if (el.focus) el.focus();
                    el.click();
                    return {{ success: true }};
                }} catch (e) {{
                    return {{ success: false, error: e.message }};
                }}
            }})()"#,
            sel = js_str(&Self::tagged(token)),
        );
        let v = self.eval(&script).await?;
        Ok(v.get("success").and_then(|s| s.as_bool()).unwrap_or(false))
    }

    pub async fn fill_tagged(&self, token: &str, value: &str) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (!el) return {{ success: false, error: 'Element not found' }};
                try {{
                    el.focus();
                    el.value = {val};
                    for (const type of ['input', 'change', 'blur']) {{
                        el.dispatchEvent(new Event(type, {{ bubbles: true, cancelable: true }}));
                    }}
                    return {{ success: true, finalValue: el.value }};
                }} catch (e) {{
                    return {{ success: false, error: e.message }};
                }}
            }})()"#,
            sel = js_str(&Self::tagged(token)),
            val = js_str(value),
        );
        let v = self.eval(&script).await?;
        Ok(v.get("success").and_then(|s| s.as_bool()).unwrap_or(false))
    }

    /// Check a checkbox/radio if it is not already checked.
    pub async fn check_tagged(&self, token: &str) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (!el) return {{ success: false, error: 'Element not found' }};
                try {{
                    if (!el.checked) el.click();
                    return {{ success: true, checked: !!el.checked }};
                }} catch (e) {{
                    return {{ success: false, error: e.message }};
                }}
            }})()"#,
            sel = js_str(&Self::tagged(token)),
        );
        let v = self.eval(&script).await?;
        Ok(v.get("success").and_then(|s| s.as_bool()).unwrap_or(false))
    }

    /// True when any of `indicators` is present: each is tried as a CSS
    /// selector first, then as a body-text fragment.
    pub async fn any_indicator_present(&self, indicators: &[String]) -> Result<bool> {
        if indicators.is_empty() {
            return Ok(false);
        }
        let script = format!(
            r#"(function() {{
                const indicators = {list};
                const body = ((document.body && document.body.innerText) || '').toLowerCase();
                for (const ind of indicators) {{
                    try {{
                        const el = document.querySelector(ind);
                        if (el) {{
                            const r = el.getBoundingClientRect();
                            if (r.width > 0 && r.height > 0) return true;
                        }}
                    }} catch (e) {{}}
                    if (body.includes(ind.toLowerCase())) return true;
                }}
                return false;
            }})()"#,
            list = serde_json::to_string(indicators)?,
        );
        let v = self.eval(&script).await?;
        Ok(v.as_bool().unwrap_or(false))
    }
}
