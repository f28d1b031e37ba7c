use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Dracula,
    Nord,
    SolarizedLight,
    SolarizedDark,
    GruvboxLight,
    GruvboxDark,
    CatppuccinMocha,
    TokyoNight,
}

impl From<Theme> for iced::Theme {
    fn from(value: Theme) -> Self {
        match value {
            Theme::Light => Self::Light,
            Theme::Dark => Self::Dark,
            Theme::Dracula => Self::Dracula,
            Theme::Nord => Self::Nord,
            Theme::SolarizedLight => Self::SolarizedLight,
            Theme::SolarizedDark => Self::SolarizedDark,
            Theme::GruvboxLight => Self::GruvboxLight,
            Theme::GruvboxDark => Self::GruvboxDark,
            Theme::CatppuccinMocha => Self::CatppuccinMocha,
            Theme::TokyoNight => Self::TokyoNight,
        }
    }
}
