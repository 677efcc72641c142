use crate::types::{DietaryPreference, Ingredient, MealType};

/// The user's pantry ingredients and filter selections for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    ingredients: Vec<Ingredient>,
    pub dietary: DietaryPreference,
    pub meal_type: MealType,
}

/// Every way the view layer can change a [`SearchState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    AddIngredient(String),
    RemoveIngredient(String),
    SetDietary(DietaryPreference),
    SetMealType(MealType),
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingredients in the order they were first added.
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.is_empty()
    }

    /// Returns `true` when the ingredient was appended. Blank input and exact
    /// (case-sensitive) duplicates are ignored.
    pub fn add_ingredient(&mut self, text: &str) -> bool {
        let Some(ingredient) = Ingredient::parse(text) else {
            return false;
        };
        if self.ingredients.contains(&ingredient) {
            return false;
        }
        self.ingredients.push(ingredient);
        true
    }

    /// Removes the first exact match. Returns `false` when nothing matched.
    pub fn remove_ingredient(&mut self, text: &str) -> bool {
        match self.ingredients.iter().position(|i| i.as_str() == text) {
            Some(index) => {
                self.ingredients.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_dietary(&mut self, dietary: DietaryPreference) {
        self.dietary = dietary;
    }

    pub fn set_meal_type(&mut self, meal_type: MealType) {
        self.meal_type = meal_type;
    }

    /// Applies `event` in place and reports whether anything changed.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        match event {
            SearchEvent::AddIngredient(text) => self.add_ingredient(&text),
            SearchEvent::RemoveIngredient(text) => self.remove_ingredient(&text),
            SearchEvent::SetDietary(dietary) => {
                let changed = self.dietary != dietary;
                self.set_dietary(dietary);
                changed
            }
            SearchEvent::SetMealType(meal_type) => {
                let changed = self.meal_type != meal_type;
                self.set_meal_type(meal_type);
                changed
            }
        }
    }
}

/// Pure state transition: `(current, event) -> next`. `current` is left untouched.
pub fn transition(current: &SearchState, event: SearchEvent) -> SearchState {
    let mut next = current.clone();
    next.apply(event);
    next
}
