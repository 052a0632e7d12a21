//! Pure projection of a [`DisplayState`] onto the named regions a front end paints.

use crate::controller::{DisplayState, ImagePanel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    LookupForm,
    LoadingIndicator,
    ErrorBanner,
    ProductPanel,
    ImagePanel,
}

impl Region {
    pub fn id(self) -> &'static str {
        match self {
            Self::LookupForm => "lookupForm",
            Self::LoadingIndicator => "loadingIndicator",
            Self::ErrorBanner => "errorBanner",
            Self::ProductPanel => "productPanel",
            Self::ImagePanel => "imagePanel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayField {
    Name,
    Category,
    Style,
    Price,
    Stock,
    GenderAffinity,
    WhereVisible,
    Description,
}

impl DisplayField {
    pub const ALL: [DisplayField; 8] = [
        Self::Name,
        Self::Category,
        Self::Style,
        Self::Price,
        Self::Stock,
        Self::GenderAffinity,
        Self::WhereVisible,
        Self::Description,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Name => "productName",
            Self::Category => "productCategory",
            Self::Style => "productStyle",
            Self::Price => "productPrice",
            Self::Stock => "productStock",
            Self::GenderAffinity => "productGender",
            Self::WhereVisible => "productVisibility",
            Self::Description => "productDescription",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Style => "Style",
            Self::Price => "Price",
            Self::Stock => "Current Stock",
            Self::GenderAffinity => "Gender Affinity",
            Self::WhereVisible => "Where Visible",
            Self::Description => "Description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedView {
    pub loading_visible: bool,
    pub error_banner: Option<String>,
    pub product_fields: Option<Vec<(DisplayField, String)>>,
    pub image: Option<ImagePanel>,
}

impl RenderedView {
    pub fn is_visible(&self, region: Region) -> bool {
        match region {
            Region::LookupForm => true,
            Region::LoadingIndicator => self.loading_visible,
            Region::ErrorBanner => self.error_banner.is_some(),
            Region::ProductPanel => self.product_fields.is_some(),
            Region::ImagePanel => self.image.is_some(),
        }
    }

    pub fn field(&self, field: DisplayField) -> Option<&str> {
        self.product_fields
            .as_ref()?
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, text)| text.as_str())
    }

    pub fn field_by_id(&self, id: &str) -> Option<&str> {
        DisplayField::ALL
            .into_iter()
            .find(|field| field.id() == id)
            .and_then(|field| self.field(field))
    }
}

pub fn render(state: &DisplayState) -> RenderedView {
    match state {
        DisplayState::Idle => RenderedView::default(),
        DisplayState::Loading { .. } => RenderedView {
            loading_visible: true,
            ..RenderedView::default()
        },
        DisplayState::Error { message } => RenderedView {
            error_banner: Some(message.clone()),
            ..RenderedView::default()
        },
        DisplayState::Success { product, image } => RenderedView {
            product_fields: Some(vec![
                (DisplayField::Name, product.name.clone()),
                (DisplayField::Category, product.category.clone()),
                (DisplayField::Style, product.style.clone()),
                (DisplayField::Price, product.price.clone()),
                (DisplayField::Stock, product.stock.clone()),
                (DisplayField::GenderAffinity, product.gender_affinity.clone()),
                (DisplayField::WhereVisible, product.where_visible.clone()),
                (DisplayField::Description, product.description.clone()),
            ]),
            image: image.clone(),
            ..RenderedView::default()
        },
    }
}
