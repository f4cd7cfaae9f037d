use std::ops::Index;

/// The five inventory categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trait {
    Extraversion,
    Agreeableness,
    Conscientiousness,
    Neuroticism,
    Openness,
}

impl Trait {
    pub const ALL: [Trait; 5] = [
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Conscientiousness,
        Trait::Neuroticism,
        Trait::Openness,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Neuroticism => "Neuroticism",
            Trait::Openness => "Openness",
        }
    }

    pub fn lower_name(self) -> &'static str {
        match self {
            Trait::Extraversion => "extraversion",
            Trait::Agreeableness => "agreeableness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Neuroticism => "neuroticism",
            Trait::Openness => "openness",
        }
    }

    /// Header label of the score column in the input table.
    pub fn column(self) -> &'static str {
        match self {
            Trait::Extraversion => "Extraversion Score",
            Trait::Agreeableness => "Agreeableness Score",
            Trait::Conscientiousness => "Conscientiousness Score",
            Trait::Neuroticism => "Neuroticism Score",
            Trait::Openness => "Openness Score",
        }
    }
}

/// One value per trait, indexed by [`Trait`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraitMap<T>([T; 5]);

impl<T> TraitMap<T> {
    pub fn from_fn(f: impl FnMut(Trait) -> T) -> Self {
        Self(Trait::ALL.map(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, &T)> {
        Trait::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Trait> for TraitMap<T> {
    type Output = T;

    fn index(&self, t: Trait) -> &T {
        &self.0[t.index()]
    }
}
