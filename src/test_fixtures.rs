//! Entities and mapping shared by the unit tests.
//!
//! `Article` declares two translatable fields backed by `ArticleTranslation`
//! rows; `NewsArticle` extends it with a translatable field of its own,
//! backed by a separate translation class.

use crate::domain::entities::collection::{ArrayCollection, EntityCollection};
use crate::domain::entities::entity::{
    Entity, EntityRef, FieldValue, ObjectIdentity, WeakEntityRef, entity_ref,
};
use crate::domain::entities::language::{DefaultLanguage, Language};
use crate::domain::entities::translatable_value::TranslatableValue;
use crate::domain::model::class_model::{ClassModel, FieldModel};
use crate::domain::model::registry::ClassRegistry;
use crate::domain::services::class_metadata::ClassTranslationMetadata;
use crate::domain::services::detached_proxy::DetachedProxy;
use crate::domain::services::translation_proxy::{TranslationCache, TranslationProxy};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub fn registry() -> ClassRegistry {
    ClassRegistry::new()
        .with(
            ClassModel::new("Article")
                .primary_language("en_GB")
                .field(FieldModel::translatable("title"))
                .field(FieldModel::translatable_as("summary", "teaser"))
                .field(FieldModel::text("slug"))
                .field(FieldModel::translation_collection(
                    "translations",
                    "ArticleTranslation",
                    "article",
                )),
        )
        .with(
            ClassModel::new("ArticleTranslation")
                .field(FieldModel::text("title"))
                .field(FieldModel::text("teaser"))
                .field(FieldModel::language("locale"))
                .field(FieldModel::to_one("article", "Article"))
                .factory(ArticleTranslation::blank),
        )
        .with(
            ClassModel::new("NewsArticle")
                .extends("Article")
                .field(FieldModel::translatable("headline"))
                .field(FieldModel::translation_collection(
                    "news_translations",
                    "NewsArticleTranslation",
                    "news",
                )),
        )
        .with(
            ClassModel::new("NewsArticleTranslation")
                .field(FieldModel::text("headline"))
                .field(FieldModel::language("locale"))
                .field(FieldModel::to_one("news", "NewsArticle"))
                .factory(NewsArticleTranslation::blank),
        )
}

fn write_translatable(slot: &mut TranslatableValue, value: FieldValue) -> bool {
    match value {
        FieldValue::Translatable(value) => *slot = value,
        FieldValue::Text(value) => *slot = TranslatableValue::Primary(Some(value)),
        FieldValue::Null => *slot = TranslatableValue::Primary(None),
        _ => return false,
    }
    true
}

fn write_text(slot: &mut Option<String>, value: FieldValue) -> bool {
    match value {
        FieldValue::Text(value) => *slot = Some(value),
        FieldValue::Null => *slot = None,
        _ => return false,
    }
    true
}

fn write_reference(slot: &mut Option<WeakEntityRef>, value: FieldValue) -> bool {
    match value {
        FieldValue::Reference(parent) => *slot = Some(parent),
        FieldValue::Null => *slot = None,
        _ => return false,
    }
    true
}

fn read_reference(slot: Option<&WeakEntityRef>) -> FieldValue {
    slot.map_or(FieldValue::Null, |parent| FieldValue::Reference(parent.clone()))
}

#[derive(Debug)]
pub struct Article {
    pub identity: ObjectIdentity,
    pub title: TranslatableValue,
    pub summary: TranslatableValue,
    pub slug: Option<String>,
    pub translations: EntityCollection,
}

impl Article {
    /// A fresh article the persistence engine has not seen yet.
    pub fn new(title: &str) -> Self {
        Self {
            identity: ObjectIdentity::new(),
            title: TranslatableValue::detached(title),
            summary: TranslatableValue::Detached(DetachedProxy::new(None, None)),
            slug: None,
            translations: ArrayCollection::shared(Vec::new()),
        }
    }

    /// An article as hydrated from storage: bare primary values only.
    pub fn loaded(title: &str, translations: EntityCollection) -> Self {
        Self {
            identity: ObjectIdentity::new(),
            title: TranslatableValue::from(title),
            summary: TranslatableValue::Primary(None),
            slug: Some(title.to_lowercase().replace(' ', "-")),
            translations,
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl Entity for Article {
    fn class_name(&self) -> &str {
        "Article"
    }

    fn identity(&self) -> ObjectIdentity {
        self.identity
    }

    fn read_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "title" => Some(FieldValue::Translatable(self.title.clone())),
            "summary" => Some(FieldValue::Translatable(self.summary.clone())),
            "slug" => Some(FieldValue::text(self.slug.clone())),
            "translations" => Some(FieldValue::Collection(Rc::clone(&self.translations))),
            _ => None,
        }
    }

    fn write_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "title" => write_translatable(&mut self.title, value),
            "summary" => write_translatable(&mut self.summary, value),
            "slug" => write_text(&mut self.slug, value),
            "translations" => match value {
                FieldValue::Collection(collection) => {
                    self.translations = collection;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ArticleTranslation {
    pub identity: ObjectIdentity,
    pub title: Option<String>,
    pub teaser: Option<String>,
    pub locale: Option<String>,
    pub article: Option<WeakEntityRef>,
}

impl ArticleTranslation {
    pub fn new(locale: &str, title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            locale: Some(locale.to_string()),
            ..Self::default()
        }
    }

    fn blank() -> EntityRef {
        entity_ref(Self::default())
    }
}

impl Entity for ArticleTranslation {
    fn class_name(&self) -> &str {
        "ArticleTranslation"
    }

    fn identity(&self) -> ObjectIdentity {
        self.identity
    }

    fn read_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "title" => Some(FieldValue::text(self.title.clone())),
            "teaser" => Some(FieldValue::text(self.teaser.clone())),
            "locale" => Some(FieldValue::text(self.locale.clone())),
            "article" => Some(read_reference(self.article.as_ref())),
            _ => None,
        }
    }

    fn write_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "title" => write_text(&mut self.title, value),
            "teaser" => write_text(&mut self.teaser, value),
            "locale" => write_text(&mut self.locale, value),
            "article" => write_reference(&mut self.article, value),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct NewsArticle {
    pub base: Article,
    pub headline: TranslatableValue,
    pub news_translations: EntityCollection,
}

impl NewsArticle {
    pub fn new(title: &str, headline: &str) -> Self {
        Self {
            base: Article::new(title),
            headline: TranslatableValue::detached(headline),
            news_translations: ArrayCollection::shared(Vec::new()),
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl Entity for NewsArticle {
    fn class_name(&self) -> &str {
        "NewsArticle"
    }

    fn identity(&self) -> ObjectIdentity {
        self.base.identity
    }

    fn read_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "headline" => Some(FieldValue::Translatable(self.headline.clone())),
            "news_translations" => Some(FieldValue::Collection(Rc::clone(
                &self.news_translations,
            ))),
            _ => self.base.read_field(name),
        }
    }

    fn write_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "headline" => write_translatable(&mut self.headline, value),
            "news_translations" => false,
            _ => self.base.write_field(name, value),
        }
    }
}

#[derive(Debug, Default)]
pub struct NewsArticleTranslation {
    pub identity: ObjectIdentity,
    pub headline: Option<String>,
    pub locale: Option<String>,
    pub news: Option<WeakEntityRef>,
}

impl NewsArticleTranslation {
    fn blank() -> EntityRef {
        entity_ref(Self::default())
    }
}

impl Entity for NewsArticleTranslation {
    fn class_name(&self) -> &str {
        "NewsArticleTranslation"
    }

    fn identity(&self) -> ObjectIdentity {
        self.identity
    }

    fn read_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "headline" => Some(FieldValue::text(self.headline.clone())),
            "locale" => Some(FieldValue::text(self.locale.clone())),
            "news" => Some(read_reference(self.news.as_ref())),
            _ => None,
        }
    }

    fn write_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "headline" => write_text(&mut self.headline, value),
            "locale" => write_text(&mut self.locale, value),
            "news" => write_reference(&mut self.news, value),
            _ => false,
        }
    }
}

/// A loaded article whose rows hold `title` values for the given languages.
pub fn article_with_rows(primary: &str, rows: &[(&str, &str)]) -> Rc<RefCell<Article>> {
    let collection = ArrayCollection::shared(Vec::new());
    let article = Article::loaded(primary, Rc::clone(&collection)).shared();
    let owner: EntityRef = article.clone();
    for (locale, title) in rows {
        let mut row = ArticleTranslation::new(locale, Some(title));
        row.article = Some(Rc::downgrade(&owner));
        collection.add(entity_ref(row));
    }
    article
}

/// An article with managed proxies injected, plus handles on its wiring.
pub struct ManagedArticle {
    pub entity: Rc<RefCell<Article>>,
    pub identity: ObjectIdentity,
    pub translations: EntityCollection,
    pub default_language: DefaultLanguage,
    pub cache: TranslationCache,
    pub metadata: Rc<ClassTranslationMetadata>,
}

impl ManagedArticle {
    pub fn article(&self) -> Ref<'_, Article> {
        self.entity.borrow()
    }

    pub fn title(&self) -> Rc<TranslationProxy> {
        Self::proxy(&self.article().title)
    }

    pub fn summary(&self) -> Rc<TranslationProxy> {
        Self::proxy(&self.article().summary)
    }

    fn proxy(value: &TranslatableValue) -> Rc<TranslationProxy> {
        value
            .as_managed()
            .cloned()
            .expect("field holds a managed proxy")
    }
}

pub fn loaded_article(primary: &str, rows: &[(&str, &str)]) -> ManagedArticle {
    manage(
        article_with_rows(primary, rows),
        DefaultLanguage::new(Language::new("en_GB")),
    )
}

pub fn managed_article_with(article: Article, default_language: DefaultLanguage) -> ManagedArticle {
    manage(article.shared(), default_language)
}

fn manage(entity: Rc<RefCell<Article>>, default_language: DefaultLanguage) -> ManagedArticle {
    let metadata = Rc::new(
        ClassTranslationMetadata::parse_from_class("Article", &Rc::new(registry()))
            .expect("fixture mapping is valid")
            .expect("Article is translatable"),
    );
    let cache = TranslationCache::new();
    let shared: EntityRef = entity.clone();
    metadata
        .inject_new_persistent_translatables(&shared, &default_language, &cache)
        .expect("injection succeeds");
    let (identity, translations) = {
        let article = entity.borrow();
        (article.identity, Rc::clone(&article.translations))
    };
    ManagedArticle {
        entity,
        identity,
        translations,
        default_language,
        cache,
        metadata,
    }
}
