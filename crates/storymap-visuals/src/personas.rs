use crate::model::Persona;
use htmlize::{escape_attribute as attr, escape_text as text};

fn pane_id(persona: &Persona) -> String {
    format!("persona-{}", persona.id)
}

fn tab_button(persona: &Persona, active: bool) -> String {
    format!(
        r##"<li class="nav-item" role="presentation"><button class="nav-link{active}" type="button" role="tab" data-bs-toggle="pill" data-bs-target="#{target}" aria-controls="{target}" aria-selected="{selected}">{title}</button></li>"##,
        active = if active { " active" } else { "" },
        target = attr(pane_id(persona)),
        selected = active,
        title = text(persona.title.as_str()),
    )
}

fn tab_pane(persona: &Persona, active: bool) -> String {
    let mut out = format!(
        r#"<div class="tab-pane fade{}" id="{}" role="tabpanel">"#,
        if active { " show active" } else { "" },
        attr(pane_id(persona))
    );
    out.push_str(r#"<div class="row align-items-start g-4">"#);

    out.push_str(r#"<div class="col-md-7">"#);
    if let Some(hero) = &persona.hero {
        let fallback = format!("{} hero", persona.title);
        out.push_str(&format!(
            r#"<img class="img-fluid rounded shadow-sm" src="{}" alt="{}" loading="lazy"/>"#,
            attr(hero.src()),
            attr(hero.alt_or(&fallback))
        ));
    }
    out.push_str("</div>");

    out.push_str(r#"<div class="col-md-5"><div class="persona-story">"#);
    // Stories are authored markup and are inserted as-is.
    out.push_str(&format!(r#"<p class="muted">{}</p>"#, persona.story));
    if !persona.images.is_empty() {
        let fallback = format!("{} visual", persona.title);
        out.push_str(r#"<div class="row g-2 mt-2">"#);
        for image in &persona.images {
            out.push_str(&format!(
                r#"<div class="col-6"><img class="img-fluid rounded border" src="{}" alt="{}" loading="lazy"/></div>"#,
                attr(image.src()),
                attr(image.alt_or(&fallback))
            ));
        }
        out.push_str("</div>");
    }
    if !persona.ctas.is_empty() {
        out.push_str(r#"<div class="mt-3">"#);
        for cta in &persona.ctas {
            out.push_str(&format!(
                r#"<a class="btn btn-outline-primary me-2 mb-2" href="{}" target="_blank" rel="noopener">{}</a>"#,
                attr(cta.href.as_str()),
                text(cta.label.as_str())
            ));
        }
        out.push_str("</div>");
    }
    out.push_str("</div></div>");

    out.push_str("</div></div>");
    out
}

/// Pill navigation plus one tab pane per persona. The first persona starts active.
pub fn render_persona_tabs(personas: &[Persona]) -> String {
    let mut out = String::from(r#"<ul class="nav nav-pills mb-3" role="tablist">"#);
    for (i, persona) in personas.iter().enumerate() {
        out.push_str(&tab_button(persona, i == 0));
    }
    out.push_str("</ul>");
    out.push_str(r#"<div class="tab-content">"#);
    for (i, persona) in personas.iter().enumerate() {
        out.push_str(&tab_pane(persona, i == 0));
    }
    out.push_str("</div>");
    out
}
