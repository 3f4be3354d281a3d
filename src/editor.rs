// ABOUTME: Editor controller for the slideforge application
// ABOUTME: Applies slide, bullet, deck and panel edits to the stored presentation and persists each change

use crate::catalog;
use crate::errors::{ForgeError, Result};
use crate::model::{NEW_BULLET_POINT, Presentation, Slide};
use crate::navigation::Key;
use crate::resources;
use crate::storage::{PanelLayout, SessionStore, Storage};
use log::{debug, info, warn};

/// Panel widths must stay strictly inside these bounds.
pub const MIN_PANEL_WIDTH: u32 = 150;
pub const MAX_PANEL_WIDTH: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Left,
    Right,
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ForgeError::IndexOutOfRange { what, index, len })
    }
}

/// Editing session over the stored presentation.
///
/// Every mutating call writes the whole deck and the panel layout back to the
/// session store before returning.
pub struct Editor<S: Storage> {
    store: SessionStore<S>,
    presentation: Presentation,
    layout: PanelLayout,
    active: usize,
}

impl<S: Storage> Editor<S> {
    /// Load the stored deck and panel layout.
    ///
    /// A missing or unreadable deck is `NoPresentation`; a deck with no slides
    /// gets a placeholder so it is never empty.
    pub fn open(store: SessionStore<S>) -> Result<Self> {
        let presentation = match store.load_presentation() {
            Ok(Some(presentation)) => presentation,
            Ok(None) => return Err(ForgeError::NoPresentation),
            Err(e) => {
                warn!("Stored presentation could not be read: {}", e);
                return Err(ForgeError::NoPresentation);
            }
        };
        let layout = store.load_layout()?;

        let mut editor = Self {
            store,
            presentation,
            layout,
            active: 0,
        };
        if editor.presentation.is_empty() {
            info!("Stored presentation has no slides; adding a placeholder");
            let transition = editor.presentation.default_transition().to_string();
            editor.presentation.slides.push(Slide::placeholder(&transition));
            editor.commit()?;
        }
        info!(
            "Opened presentation {:?} with {} slides",
            editor.presentation.title,
            editor.presentation.len()
        );
        Ok(editor)
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_slide(&self) -> &Slide {
        &self.presentation.slides[self.active]
    }

    pub fn is_first(&self) -> bool {
        self.active == 0
    }

    pub fn is_last(&self) -> bool {
        self.active + 1 >= self.presentation.len()
    }

    fn commit(&mut self) -> Result<()> {
        self.store.save_presentation(&self.presentation)?;
        self.store.save_layout(&self.layout)?;
        Ok(())
    }

    fn clamp_active(&mut self) {
        let last = self.presentation.len().saturating_sub(1);
        self.active = self.active.min(last);
    }

    fn slide_mut(&mut self, index: usize) -> Result<&mut Slide> {
        check_index("slide", index, self.presentation.len())?;
        Ok(&mut self.presentation.slides[index])
    }

    // Navigation

    /// Make `index` the active slide, clamped to the deck.
    pub fn select(&mut self, index: usize) {
        self.active = index;
        self.clamp_active();
    }

    pub fn previous(&mut self) {
        if self.active > 0 {
            self.active -= 1;
        }
    }

    pub fn next(&mut self) {
        if !self.is_last() {
            self.active += 1;
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Left => self.previous(),
            Key::Right => self.next(),
            _ => {}
        }
    }

    // Slides

    /// Append a placeholder slide and make it active. Returns its index.
    pub fn add_slide(&mut self) -> Result<usize> {
        let transition = self.presentation.default_transition().to_string();
        self.presentation.slides.push(Slide::placeholder(&transition));
        self.active = self.presentation.len() - 1;
        debug!("Added slide {}", self.active + 1);
        self.commit()?;
        Ok(self.active)
    }

    /// Remove the slide at `index`. Returns `false` when it is the only
    /// slide, in which case nothing changes.
    pub fn delete_slide(&mut self, index: usize) -> Result<bool> {
        check_index("slide", index, self.presentation.len())?;
        if self.presentation.len() <= 1 {
            info!("Refusing to delete the only slide");
            return Ok(false);
        }
        let removed = self.presentation.slides.remove(index);
        debug!("Deleted slide {}", removed.id);
        self.clamp_active();
        self.commit()?;
        Ok(true)
    }

    /// Move the slide at `from` to `to`; the moved slide becomes active.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.presentation.len();
        check_index("slide", from, len)?;
        check_index("slide", to, len)?;
        if from == to {
            return Ok(());
        }
        let slide = self.presentation.slides.remove(from);
        self.presentation.slides.insert(to, slide);
        self.active = to;
        self.commit()
    }

    /// Drag-and-drop form of `reorder`: drop the slide `active_id` onto the
    /// position of `over_id`. Equal or unknown ids leave the deck alone.
    pub fn reorder_by_id(&mut self, active_id: &str, over_id: &str) -> Result<()> {
        if active_id == over_id {
            return Ok(());
        }
        match (
            self.presentation.position_of(active_id),
            self.presentation.position_of(over_id),
        ) {
            (Some(from), Some(to)) => self.reorder(from, to),
            _ => {
                debug!("Ignoring drop of {} onto {}", active_id, over_id);
                Ok(())
            }
        }
    }

    // Slide fields

    pub fn set_title(&mut self, index: usize, title: &str) -> Result<()> {
        self.slide_mut(index)?.title = title.to_string();
        self.commit()
    }

    /// Attach an inline image. Only base64 `data:image/...` URLs are accepted.
    pub fn set_image(&mut self, index: usize, data_url: &str) -> Result<()> {
        check_index("slide", index, self.presentation.len())?;
        let (mime, _) = resources::decode_data_url(data_url)?;
        if !mime.starts_with("image/") {
            return Err(ForgeError::InvalidImage(format!(
                "{} is not an image type",
                mime
            )));
        }
        self.slide_mut(index)?.image_url = data_url.to_string();
        self.commit()
    }

    pub fn clear_image(&mut self, index: usize) -> Result<()> {
        self.slide_mut(index)?.image_url.clear();
        self.commit()
    }

    pub fn set_transition(&mut self, index: usize, transition: &str) -> Result<()> {
        check_index("slide", index, self.presentation.len())?;
        catalog::validate_transition(transition)?;
        self.slide_mut(index)?.transition = transition.to_string();
        self.commit()
    }

    // Bullets

    /// Append the placeholder bullet. Returns its index.
    pub fn add_bullet(&mut self, slide: usize) -> Result<usize> {
        let bullets = &mut self.slide_mut(slide)?.bullet_points;
        bullets.push(NEW_BULLET_POINT.to_string());
        let index = bullets.len() - 1;
        self.commit()?;
        Ok(index)
    }

    pub fn edit_bullet(&mut self, slide: usize, bullet: usize, text: &str) -> Result<()> {
        let bullets = &mut self.slide_mut(slide)?.bullet_points;
        check_index("bullet", bullet, bullets.len())?;
        bullets[bullet] = text.to_string();
        self.commit()
    }

    pub fn remove_bullet(&mut self, slide: usize, bullet: usize) -> Result<()> {
        let bullets = &mut self.slide_mut(slide)?.bullet_points;
        check_index("bullet", bullet, bullets.len())?;
        bullets.remove(bullet);
        self.commit()
    }

    pub fn replace_bullets(&mut self, slide: usize, bullets: Vec<String>) -> Result<()> {
        self.slide_mut(slide)?.bullet_points = bullets;
        self.commit()
    }

    // Deck

    pub fn set_template(&mut self, template: &str) -> Result<()> {
        catalog::validate_template(template)?;
        self.presentation.template = template.to_string();
        self.commit()
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        catalog::validate_theme(theme)?;
        self.presentation.theme = theme.to_string();
        self.commit()
    }

    /// Set the transition that newly added slides start with.
    pub fn set_deck_transition(&mut self, transition: &str) -> Result<()> {
        catalog::validate_transition(transition)?;
        self.presentation.transition = Some(transition.to_string());
        self.commit()
    }

    // Panels

    pub fn toggle_panel(&mut self, panel: Panel) -> Result<bool> {
        let collapsed = match panel {
            Panel::Left => &mut self.layout.left_collapsed,
            Panel::Right => &mut self.layout.right_collapsed,
        };
        *collapsed = !*collapsed;
        let now = *collapsed;
        self.commit()?;
        Ok(now)
    }

    /// Resize a panel. Widths outside the open interval (150, 500) are
    /// ignored and `false` is returned.
    pub fn resize_panel(&mut self, panel: Panel, width: u32) -> Result<bool> {
        if width <= MIN_PANEL_WIDTH || width >= MAX_PANEL_WIDTH {
            debug!("Ignoring panel width {}", width);
            return Ok(false);
        }
        match panel {
            Panel::Left => self.layout.left_width = width,
            Panel::Right => self.layout.right_width = width,
        }
        self.commit()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn store_with(slides: usize) -> SessionStore<Arc<MemoryStorage>> {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let slides = (0..slides)
            .map(|i| Slide::new(format!("Slide {}", i + 1), vec!["point".to_string()]))
            .collect();
        let presentation = Presentation::new("Deck", "classic-clean", "dark", slides);
        store.save_presentation(&presentation).unwrap();
        store
    }

    fn editor_with(slides: usize) -> Editor<Arc<MemoryStorage>> {
        Editor::open(store_with(slides)).unwrap()
    }

    fn titles<S: Storage>(editor: &Editor<S>) -> Vec<String> {
        editor
            .presentation()
            .slides
            .iter()
            .map(|s| s.title.clone())
            .collect()
    }

    #[test]
    fn missing_or_corrupt_deck_is_no_presentation() {
        let store = SessionStore::new(MemoryStorage::new());
        assert!(matches!(Editor::open(store), Err(ForgeError::NoPresentation)));

        let storage = MemoryStorage::new();
        storage.set("presentation", "{not json").unwrap();
        assert!(matches!(
            Editor::open(SessionStore::new(storage)),
            Err(ForgeError::NoPresentation)
        ));
    }

    #[test]
    fn empty_deck_gets_placeholder() {
        let editor = editor_with(0);
        assert_eq!(editor.presentation().len(), 1);
        assert_eq!(editor.active_slide().title, "New Slide Title");
        let stored = editor.store().load_presentation().unwrap().unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut editor = editor_with(3);
        editor.previous();
        assert_eq!(editor.active_index(), 0);
        editor.handle_key(Key::Right);
        editor.handle_key(Key::Right);
        editor.handle_key(Key::Right);
        assert_eq!(editor.active_index(), 2);
        editor.handle_key(Key::Left);
        assert_eq!(editor.active_index(), 1);
        editor.select(99);
        assert_eq!(editor.active_index(), 2);
    }

    #[test]
    fn add_slide_uses_deck_transition_and_becomes_active() {
        let mut editor = editor_with(2);
        editor.set_deck_transition("fade").unwrap();
        let index = editor.add_slide().unwrap();
        assert_eq!(index, 2);
        assert_eq!(editor.active_index(), 2);
        let slide = editor.active_slide();
        assert_eq!(slide.title, "New Slide Title");
        assert_eq!(slide.bullet_points, vec!["Your content here."]);
        assert_eq!(slide.image_url, "");
        assert_eq!(slide.transition, "fade");
    }

    #[test]
    fn deleting_only_slide_is_noop() {
        let mut editor = editor_with(1);
        let before = editor.presentation().clone();
        assert!(!editor.delete_slide(0).unwrap());
        assert_eq!(editor.presentation(), &before);
    }

    #[test]
    fn delete_reclamps_active() {
        let mut editor = editor_with(3);
        editor.select(2);
        assert!(editor.delete_slide(2).unwrap());
        assert_eq!(editor.active_index(), 1);
        assert_eq!(titles(&editor), vec!["Slide 1", "Slide 2"]);
    }

    #[test]
    fn reorder_and_back_restores_order() {
        let mut editor = editor_with(5);
        let original = editor.presentation().slide_ids().join(",");
        editor.reorder(0, 3).unwrap();
        assert_eq!(editor.active_index(), 3);
        assert_eq!(editor.active_slide().title, "Slide 1");
        editor.reorder(3, 0).unwrap();
        assert_eq!(editor.presentation().slide_ids().join(","), original);
    }

    #[test]
    fn reorder_by_id_ignores_unknown_and_equal_ids() {
        let mut editor = editor_with(3);
        let ids: Vec<String> = editor
            .presentation()
            .slide_ids()
            .into_iter()
            .map(String::from)
            .collect();
        editor.reorder_by_id(&ids[0], &ids[0]).unwrap();
        editor.reorder_by_id(&ids[0], "missing").unwrap();
        assert_eq!(titles(&editor), vec!["Slide 1", "Slide 2", "Slide 3"]);

        editor.reorder_by_id(&ids[2], &ids[0]).unwrap();
        assert_eq!(titles(&editor), vec!["Slide 3", "Slide 1", "Slide 2"]);
        assert_eq!(editor.active_index(), 0);
    }

    #[test]
    fn active_index_stays_in_range() {
        let mut editor = editor_with(2);
        editor.add_slide().unwrap();
        editor.add_slide().unwrap();
        editor.delete_slide(3).unwrap();
        editor.reorder(0, 2).unwrap();
        editor.delete_slide(2).unwrap();
        editor.delete_slide(0).unwrap();
        editor.delete_slide(0).unwrap();
        assert!(editor.active_index() < editor.presentation().len());
        assert_eq!(editor.presentation().len(), 1);
    }

    #[derive(Debug, Clone, Copy)]
    enum Edit {
        Add,
        Delete(usize),
        Reorder(usize, usize),
    }

    fn all_edits() -> Vec<Edit> {
        let mut edits = vec![Edit::Add];
        for i in 0..3 {
            edits.push(Edit::Delete(i));
            for j in 0..3 {
                edits.push(Edit::Reorder(i, j));
            }
        }
        edits
    }

    #[test]
    fn active_index_in_range_for_every_edit_sequence() {
        let edits = all_edits();
        let n = edits.len();
        for slides in 1..=3 {
            for code in 0..n.pow(4) {
                let sequence: Vec<Edit> = (0..4).map(|k| edits[code / n.pow(k) % n]).collect();
                let mut editor = editor_with(slides);
                for (step, edit) in sequence.iter().enumerate() {
                    // Out-of-range indices are rejected; the state must stay valid either way.
                    let _ = match *edit {
                        Edit::Add => editor.add_slide().map(|_| ()),
                        Edit::Delete(i) => editor.delete_slide(i).map(|_| ()),
                        Edit::Reorder(from, to) => editor.reorder(from, to),
                    };
                    let len = editor.presentation().len();
                    assert!(
                        len >= 1 && editor.active_index() < len,
                        "{} slides, {:?} broke at step {}: active {} of {}",
                        slides,
                        sequence,
                        step,
                        editor.active_index(),
                        len
                    );
                }
            }
        }
    }

    #[test]
    fn bad_indices_leave_state_unchanged() {
        let mut editor = editor_with(2);
        let before = editor.presentation().clone();
        assert!(matches!(
            editor.set_title(5, "x"),
            Err(ForgeError::IndexOutOfRange { what: "slide", .. })
        ));
        assert!(matches!(
            editor.edit_bullet(0, 9, "x"),
            Err(ForgeError::IndexOutOfRange { what: "bullet", .. })
        ));
        assert!(editor.remove_bullet(0, 1).is_err());
        assert!(editor.delete_slide(2).is_err());
        assert!(editor.reorder(0, 2).is_err());
        assert_eq!(editor.presentation(), &before);
    }

    #[test]
    fn bullet_edits_persist() {
        let mut editor = editor_with(1);
        assert_eq!(editor.add_bullet(0).unwrap(), 1);
        editor.edit_bullet(0, 0, "first").unwrap();
        editor.remove_bullet(0, 1).unwrap();
        editor
            .replace_bullets(0, vec!["a".to_string(), "b".to_string()])
            .unwrap();

        let stored = editor.store().load_presentation().unwrap().unwrap();
        assert_eq!(stored.slides[0].bullet_points, vec!["a", "b"]);
    }

    #[test]
    fn field_setters_validate() {
        let mut editor = editor_with(1);
        assert!(editor.set_transition(0, "spin").is_err());
        editor.set_transition(0, "doors").unwrap();
        assert!(editor.set_template("neon").is_err());
        editor.set_template("hologram-ui").unwrap();
        assert!(editor.set_theme("sepia").is_err());

        assert!(matches!(
            editor.set_image(0, "https://example.com/a.png"),
            Err(ForgeError::InvalidImage(_))
        ));
        assert!(editor.set_image(0, "data:text/plain;base64,aGk=").is_err());
        editor.set_image(0, PNG_URL).unwrap();
        assert!(editor.active_slide().has_image());
        editor.clear_image(0).unwrap();
        assert!(!editor.active_slide().has_image());

        let stored = editor.store().load_presentation().unwrap().unwrap();
        assert_eq!(stored.template, "hologram-ui");
        assert_eq!(stored.slides[0].transition, "doors");
    }

    #[test]
    fn panel_resize_bounds_are_exclusive() {
        let mut editor = editor_with(1);
        assert!(!editor.resize_panel(Panel::Left, 150).unwrap());
        assert!(!editor.resize_panel(Panel::Left, 500).unwrap());
        assert!(editor.resize_panel(Panel::Left, 151).unwrap());
        assert!(editor.resize_panel(Panel::Right, 499).unwrap());
        assert!(editor.toggle_panel(Panel::Right).unwrap());

        let layout = editor.store().load_layout().unwrap();
        assert_eq!(layout.left_width, 151);
        assert_eq!(layout.right_width, 499);
        assert!(layout.right_collapsed);
        assert!(!layout.left_collapsed);
    }
}
