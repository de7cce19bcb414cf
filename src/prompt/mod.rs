//! Scene templates and prompt construction
//!
//! Each scene key selects a base prompt. Templates carry a single
//! `{palette}` placeholder which receives the palette clause.

/// Placeholder token substituted with the palette clause
pub const PALETTE_PLACEHOLDER: &str = "{palette}";

/// Built-in scene templates: (scene key, template)
const SCENE_PROMPTS: &[(&str, &str)] = &[
    (
        "interior",
        "Scandinavian living room interior render, cozy and bright, {palette}",
    ),
    (
        "ppt",
        "A clean, minimalist PowerPoint slide background with soft gradients and ample white space. {palette}",
    ),
    (
        "fashion",
        "A modern streetwear outfit concept illustration on a white backdrop, {palette}",
    ),
    (
        "dog",
        "A cute dog sitting in a field of flowers, watercolor style. {palette}",
    ),
    (
        "cat",
        "An elegant cat sitting on a windowsill, soft lighting and warm tones. {palette}",
    ),
    (
        "coffee",
        "A cozy coffee shop scene with latte art, wooden furniture, and warm lighting. {palette}",
    ),
    (
        "space",
        "A vibrant galaxy scene with stars, planets, and cosmic dust, digital painting style. {palette}",
    ),
    (
        "forest",
        "A serene forest landscape with sunrays filtering through tall trees. {palette}",
    ),
];

/// Look up the template for a scene key.
///
/// Unknown keys are returned verbatim and act as their own template. Such a
/// template has no placeholder, so the palette clause never reaches the
/// prompt on this path.
pub fn map_scene(scene: &str) -> &str {
    let scene = scene.trim();
    SCENE_PROMPTS
        .iter()
        .find(|(key, _)| *key == scene)
        .map(|(_, template)| *template)
        .unwrap_or(scene)
}

/// All known scene keys, in table order
pub fn scene_keys() -> impl Iterator<Item = &'static str> {
    SCENE_PROMPTS.iter().map(|(key, _)| *key)
}

/// Palette clause appended to every templated prompt
pub fn palette_clause<S: AsRef<str>>(colors: &[S], name: &str, description: &str) -> String {
    let colors = colors
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Use only these colors: {colors}. Palette name: {name} - {description}.")
}

/// Build the final prompt for a scene and palette
pub fn build_prompt<S: AsRef<str>>(
    scene: &str,
    colors: &[S],
    name: &str,
    description: &str,
) -> String {
    let template = map_scene(scene);
    if !template.contains(PALETTE_PLACEHOLDER) {
        return template.to_string();
    }
    template.replace(PALETTE_PLACEHOLDER, &palette_clause(colors, name, description))
}
