#[cfg(test)]
mod tests {
    use crate::assets::{
        Asset, AssetExchange, AssetExchangeUpdate, AssetRepositoryTrait, AssetUpdate,
        ChangeAssetAddress, NewAsset, NewAssetExchange, SetRate,
    };
    use crate::errors::{Error, Result, SettingError, ValidationError};
    use crate::exchanges::{Exchange, ExchangeRepositoryTrait, ExchangeUpdate, NewExchange};
    use crate::pending::{PendingObject, PendingObjectRepositoryTrait};
    use crate::setting_change::{
        ChangeCatalog, EnrichmentPolicy, LiveExchangeInfoProvider, LiveTradingInfo,
        SettingChange, SettingChangeApplierTrait, SettingChangeConfig, SettingChangeEntry,
        SettingChangeService, SettingChangeServiceTrait, TradingPairSymbols,
    };
    use crate::trading_pairs::{
        CreateTradingPair, NewTradingBy, NewTradingPair, TradingBy, TradingPair,
        TradingPairRepositoryTrait, TradingPairUpdate,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn addr(n: u32) -> String {
        format!("0x{:040x}", n)
    }

    fn not_found(what: String) -> Error {
        SettingError::NotFound(what).into()
    }

    fn kind_of(err: &Error) -> SettingError {
        err.setting_error()
            .cloned()
            .unwrap_or_else(|| panic!("expected a setting error, got {:?}", err))
    }

    // --- Mock AssetRepository ---
    struct MockAssetRepository {
        assets: Mutex<Vec<Asset>>,
    }

    #[async_trait]
    impl AssetRepositoryTrait for MockAssetRepository {
        fn get_by_id(&self, asset_id: i64) -> Result<Asset> {
            self.assets
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == asset_id)
                .cloned()
                .ok_or_else(|| not_found(format!("asset {}", asset_id)))
        }

        fn list(&self) -> Result<Vec<Asset>> {
            Ok(self.assets.lock().unwrap().clone())
        }

        fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>> {
            Ok(self
                .assets
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.symbol == symbol)
                .cloned())
        }

        fn is_address_in_use(&self, address: &str) -> Result<bool> {
            let address = address.to_lowercase();
            Ok(self.assets.lock().unwrap().iter().any(|a| {
                a.address.as_deref() == Some(address.as_str())
                    || a.old_addresses.iter().any(|old| *old == address)
            }))
        }

        fn get_asset_exchange(&self, asset_exchange_id: i64) -> Result<AssetExchange> {
            self.assets
                .lock()
                .unwrap()
                .iter()
                .flat_map(|a| a.exchanges.iter())
                .find(|ae| ae.id == asset_exchange_id)
                .cloned()
                .ok_or_else(|| not_found(format!("asset exchange {}", asset_exchange_id)))
        }

        fn find_asset_exchange(
            &self,
            asset_id: i64,
            exchange_id: i64,
        ) -> Result<Option<AssetExchange>> {
            Ok(self
                .assets
                .lock()
                .unwrap()
                .iter()
                .flat_map(|a| a.exchanges.iter())
                .find(|ae| ae.asset_id == asset_id && ae.exchange_id == exchange_id)
                .cloned())
        }

        async fn create(&self, _new_asset: NewAsset) -> Result<i64> {
            unimplemented!()
        }

        async fn update(&self, _update: AssetUpdate) -> Result<()> {
            unimplemented!()
        }

        async fn change_address(&self, _change: ChangeAssetAddress) -> Result<()> {
            unimplemented!()
        }

        async fn create_asset_exchange(&self, _new: NewAssetExchange) -> Result<i64> {
            unimplemented!()
        }

        async fn update_asset_exchange(&self, _update: AssetExchangeUpdate) -> Result<()> {
            unimplemented!()
        }

        async fn delete_asset_exchange(&self, _asset_exchange_id: i64) -> Result<()> {
            unimplemented!()
        }
    }

    // --- Mock ExchangeRepository ---
    struct MockExchangeRepository {
        exchanges: Vec<Exchange>,
    }

    #[async_trait]
    impl ExchangeRepositoryTrait for MockExchangeRepository {
        fn get_by_id(&self, exchange_id: i64) -> Result<Exchange> {
            self.exchanges
                .iter()
                .find(|e| e.id == exchange_id)
                .cloned()
                .ok_or_else(|| not_found(format!("exchange {}", exchange_id)))
        }

        fn list(&self) -> Result<Vec<Exchange>> {
            Ok(self.exchanges.clone())
        }

        async fn create(&self, _new_exchange: NewExchange) -> Result<i64> {
            unimplemented!()
        }

        async fn update(&self, _update: ExchangeUpdate) -> Result<()> {
            unimplemented!()
        }
    }

    // --- Mock TradingPairRepository ---
    struct MockTradingPairRepository {
        trading_pairs: Vec<TradingPair>,
        trading_by: Vec<TradingBy>,
    }

    #[async_trait]
    impl TradingPairRepositoryTrait for MockTradingPairRepository {
        fn get_by_id(&self, trading_pair_id: i64) -> Result<TradingPair> {
            self.trading_pairs
                .iter()
                .find(|tp| tp.id == trading_pair_id)
                .cloned()
                .ok_or_else(|| not_found(format!("trading pair {}", trading_pair_id)))
        }

        fn list_by_exchange(&self, exchange_id: i64) -> Result<Vec<TradingPair>> {
            Ok(self
                .trading_pairs
                .iter()
                .filter(|tp| tp.exchange_id == exchange_id)
                .cloned()
                .collect())
        }

        fn list_by_asset_on_exchange(
            &self,
            asset_id: i64,
            exchange_id: i64,
        ) -> Result<Vec<TradingPair>> {
            Ok(self
                .trading_pairs
                .iter()
                .filter(|tp| tp.exchange_id == exchange_id && tp.involves(asset_id))
                .cloned()
                .collect())
        }

        fn find_trading_by(
            &self,
            asset_id: i64,
            trading_pair_id: i64,
        ) -> Result<Option<TradingBy>> {
            Ok(self
                .trading_by
                .iter()
                .find(|tb| tb.asset_id == asset_id && tb.trading_pair_id == trading_pair_id)
                .cloned())
        }

        async fn create(&self, _entry: CreateTradingPair) -> Result<i64> {
            unimplemented!()
        }

        async fn update(&self, _update: TradingPairUpdate) -> Result<()> {
            unimplemented!()
        }

        async fn delete(&self, _trading_pair_id: i64) -> Result<()> {
            unimplemented!()
        }

        async fn create_trading_by(&self, _trading_by: NewTradingBy) -> Result<i64> {
            unimplemented!()
        }
    }

    // --- Mock PendingObjectRepository ---
    #[derive(Default)]
    struct MockPendingRepository {
        objects: Mutex<Vec<PendingObject>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl PendingObjectRepositoryTrait for MockPendingRepository {
        async fn stage(&self, kind: &str, payload: String, singleton: bool) -> Result<i64> {
            let mut objects = self.objects.lock().unwrap();
            if singleton {
                objects.retain(|o| o.kind != kind);
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            objects.push(PendingObject {
                id: *next_id,
                kind: kind.to_string(),
                payload,
                created_at: chrono::Utc::now().naive_utc(),
            });
            Ok(*next_id)
        }

        fn get(&self, kind: &str, id: i64) -> Result<PendingObject> {
            self.objects
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.kind == kind && o.id == id)
                .cloned()
                .ok_or_else(|| not_found(format!("pending object {}", id)))
        }

        fn list(&self, kind: &str) -> Result<Vec<PendingObject>> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.kind == kind)
                .cloned()
                .collect())
        }

        async fn delete(&self, kind: &str, id: i64) -> Result<()> {
            let mut objects = self.objects.lock().unwrap();
            let before = objects.len();
            objects.retain(|o| !(o.kind == kind && o.id == id));
            if objects.len() == before {
                return Err(not_found(format!("pending object {}", id)));
            }
            Ok(())
        }
    }

    // --- Mock applier: consumes the pending object like the real one ---
    struct MockApplier {
        pending: Arc<MockPendingRepository>,
        applied: Mutex<Vec<SettingChange>>,
    }

    #[async_trait]
    impl SettingChangeApplierTrait for MockApplier {
        async fn confirm(&self, kind: &str, id: i64) -> Result<()> {
            let object = self.pending.get(kind, id)?;
            let change = SettingChange::from_payload(&object.payload)?;
            self.pending.delete(kind, id).await?;
            self.applied.lock().unwrap().push(change);
            Ok(())
        }
    }

    // --- Mock LiveExchangeInfoProvider ---
    struct FixedExchangeInfo {
        info: Option<LiveTradingInfo>,
        requests: Mutex<Vec<TradingPairSymbols>>,
    }

    #[async_trait]
    impl LiveExchangeInfoProvider for FixedExchangeInfo {
        async fn get_live_trading_info(
            &self,
            _exchange_id: i64,
            pairs: &[TradingPairSymbols],
        ) -> Result<HashMap<usize, LiveTradingInfo>> {
            self.requests.lock().unwrap().extend_from_slice(pairs);
            match self.info {
                Some(info) => Ok((0..pairs.len()).map(|i| (i, info)).collect()),
                None => Err(Error::Unexpected("venue offline".to_string())),
            }
        }
    }

    // --- Fixture ---
    fn asset_exchange(id: i64, asset_id: i64, symbol: &str) -> AssetExchange {
        AssetExchange {
            id,
            asset_id,
            exchange_id: 1,
            symbol: symbol.to_string(),
            deposit_address: Some(addr(900 + id as u32)),
            min_deposit: 0.0,
            withdraw_fee: 0.0,
            target_recommended: 0.0,
            target_ratio: 0.0,
            trading_pairs: vec![],
        }
    }

    fn asset(id: i64, symbol: &str, is_quote: bool) -> Asset {
        let now = chrono::Utc::now().naive_utc();
        Asset {
            id,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            address: Some(addr(id as u32)),
            old_addresses: vec![],
            decimals: 18,
            transferable: true,
            set_rate: SetRate::NotSet,
            rebalance: false,
            is_quote,
            pwi: None,
            rebalance_quadratic: None,
            exchanges: vec![],
            target: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn knc_eth_pair() -> TradingPair {
        TradingPair {
            id: 100,
            exchange_id: 1,
            base: 2,
            quote: 1,
            price_precision: 6,
            amount_precision: 2,
            amount_limit_min: 1.0,
            amount_limit_max: 10000.0,
            price_limit_min: 0.0001,
            price_limit_max: 1.0,
            min_notional: 0.01,
        }
    }

    struct Fixture {
        service: SettingChangeService,
        pending: Arc<MockPendingRepository>,
        applier: Arc<MockApplier>,
    }

    /// ETH (1, quote) and KNC (2) are listed on exchange 1 with the KNC/ETH
    /// pair 100; OMG (3) is not transferable and has no exchange.
    fn setup(config: SettingChangeConfig, info: Option<Arc<FixedExchangeInfo>>) -> Fixture {
        let mut eth = asset(1, "ETH", true);
        eth.old_addresses = vec![addr(77)];
        eth.exchanges = vec![asset_exchange(10, 1, "ETH")];

        let mut knc = asset(2, "KNC", false);
        let mut knc_on_exchange = asset_exchange(11, 2, "KNC");
        knc_on_exchange.trading_pairs = vec![knc_eth_pair()];
        knc.exchanges = vec![knc_on_exchange];

        let mut omg = asset(3, "OMG", false);
        omg.transferable = false;
        omg.address = None;

        let asset_repository: Arc<dyn AssetRepositoryTrait> = Arc::new(MockAssetRepository {
            assets: Mutex::new(vec![eth, knc, omg]),
        });
        let exchange_repository = Arc::new(MockExchangeRepository {
            exchanges: vec![Exchange {
                id: 1,
                name: "binance".to_string(),
                trading_fee_maker: Some(0.001),
                trading_fee_taker: Some(0.001),
                disable: false,
            }],
        });
        let trading_pair_repository = Arc::new(MockTradingPairRepository {
            trading_pairs: vec![knc_eth_pair()],
            trading_by: vec![
                TradingBy {
                    id: 1,
                    asset_id: 2,
                    trading_pair_id: 100,
                },
                TradingBy {
                    id: 2,
                    asset_id: 1,
                    trading_pair_id: 100,
                },
            ],
        });
        let pending = Arc::new(MockPendingRepository::default());
        let applier = Arc::new(MockApplier {
            pending: pending.clone(),
            applied: Mutex::new(vec![]),
        });

        let mut service = SettingChangeService::new(
            asset_repository.clone(),
            exchange_repository,
            trading_pair_repository,
            pending.clone(),
            applier.clone(),
            config,
        );
        if let Some(provider) = info {
            service = service.with_exchange_info(provider, asset_repository);
        }
        Fixture {
            service,
            pending,
            applier,
        }
    }

    fn new_xyz() -> NewAsset {
        NewAsset {
            symbol: "XYZ".to_string(),
            name: "Xyz".to_string(),
            address: Some(addr(50)),
            decimals: 18,
            transferable: true,
            exchanges: vec![NewAssetExchange {
                exchange_id: 1,
                symbol: "XYZ".to_string(),
                deposit_address: Some(addr(51)),
                trading_pairs: vec![NewTradingPair {
                    base: 0,
                    quote: 1,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn change(entries: Vec<SettingChangeEntry>) -> SettingChange {
        SettingChange::new(entries)
    }

    const MAIN: ChangeCatalog = ChangeCatalog::SettingChangeMain;

    #[tokio::test]
    async fn test_stage_and_read_back_proposal() {
        let f = setup(SettingChangeConfig::default(), None);
        let submitted = change(vec![SettingChangeEntry::CreateAsset(new_xyz())]);

        let id = f.service.stage_change(MAIN, submitted.clone()).await.unwrap();

        let proposal = f.service.get_proposal(MAIN, id).unwrap();
        assert_eq!(proposal.id, id);
        assert_eq!(proposal.catalog, MAIN);
        assert_eq!(proposal.change, submitted);
        assert_eq!(f.service.list_proposals(MAIN).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_proposal_is_scoped_by_catalog() {
        let f = setup(SettingChangeConfig::default(), None);
        let id = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(new_xyz())]))
            .await
            .unwrap();

        let err = f
            .service
            .get_proposal(ChangeCatalog::SettingChangeTarget, id)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_change_is_rejected() {
        let f = setup(SettingChangeConfig::default(), None);
        let err = f
            .service
            .stage_change(MAIN, SettingChange::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_trading_pair_fails_at_its_entry() {
        let f = setup(SettingChangeConfig::default(), None);
        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![
                    SettingChangeEntry::UpdateExchange(ExchangeUpdate {
                        exchange_id: 1,
                        trading_fee_maker: Some(0.002),
                        ..Default::default()
                    }),
                    SettingChangeEntry::CreateTradingBy(NewTradingBy {
                        asset_id: 2,
                        trading_pair_id: 999,
                    }),
                ]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.entry_index(), Some(1));
        assert!(err.is_not_found());
        assert!(f.pending.list(MAIN.as_str()).unwrap().is_empty());
    }

    fn list_omg() -> SettingChangeEntry {
        SettingChangeEntry::CreateAssetExchange(NewAssetExchange {
            asset_id: 3,
            exchange_id: 1,
            symbol: "OMG".to_string(),
            ..Default::default()
        })
    }

    fn omg_pair(base: i64, quote: i64) -> SettingChangeEntry {
        SettingChangeEntry::CreateTradingPair(CreateTradingPair {
            trading_pair: NewTradingPair {
                base,
                quote,
                ..Default::default()
            },
            asset_id: 3,
            exchange_id: 1,
        })
    }

    #[tokio::test]
    async fn test_entry_may_depend_on_earlier_entry() {
        let f = setup(SettingChangeConfig::default(), None);

        // On its own the pair is rejected: OMG is not listed yet.
        let err = f
            .service
            .stage_change(MAIN, change(vec![omg_pair(0, 1)]))
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::BaseAssetInvalid);

        let id = f
            .service
            .stage_change(MAIN, change(vec![list_omg(), omg_pair(0, 1)]))
            .await
            .unwrap();
        assert_eq!(
            f.service.get_proposal(MAIN, id).unwrap().change.change_list.len(),
            2
        );
    }

    #[tokio::test]
    async fn test_later_entries_keep_local_checks() {
        let f = setup(SettingChangeConfig::default(), None);

        let err = f
            .service
            .stage_change(MAIN, change(vec![list_omg(), omg_pair(2, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.entry_index(), Some(1));
        assert_eq!(kind_of(&err), SettingError::TradingByAssetIdInvalid);

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![
                    SettingChangeEntry::CreateAsset(new_xyz()),
                    SettingChangeEntry::ChangeAssetAddr(ChangeAssetAddress {
                        asset_id: 2,
                        address: "0x12".to_string(),
                    }),
                ]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.entry_index(), Some(1));
        assert!(matches!(kind_of(&err), SettingError::InvalidAddress(_)));
        assert!(f.pending.list(MAIN.as_str()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reference_after_create_is_left_to_confirm() {
        let f = setup(SettingChangeConfig::default(), None);
        let id = f
            .service
            .stage_change(
                MAIN,
                change(vec![
                    SettingChangeEntry::CreateAsset(new_xyz()),
                    SettingChangeEntry::CreateTradingBy(NewTradingBy {
                        asset_id: 2,
                        trading_pair_id: 999,
                    }),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(f.service.get_proposal(MAIN, id).unwrap().id, id);
    }

    #[tokio::test]
    async fn test_duplicate_symbol_and_superseded_address() {
        let f = setup(SettingChangeConfig::default(), None);

        let mut duplicate = new_xyz();
        duplicate.symbol = "KNC".to_string();
        let err = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(duplicate)]))
            .await
            .unwrap_err();
        assert_eq!(err.entry_index(), Some(0));
        assert_eq!(kind_of(&err), SettingError::SymbolExists);

        let mut reused = new_xyz();
        reused.address = Some(addr(77).to_uppercase().replace("0X", "0x"));
        let err = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(reused)]))
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::AddressExists);
    }

    #[tokio::test]
    async fn test_implicit_base_requires_quote_asset() {
        let f = setup(SettingChangeConfig::default(), None);

        let mut quoted_in_knc = new_xyz();
        quoted_in_knc.exchanges[0].trading_pairs[0].quote = 2;
        let err = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(quoted_in_knc)]))
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::QuoteAssetInvalid);

        let mut unknown_quote = new_xyz();
        unknown_quote.exchanges[0].trading_pairs[0].quote = 42;
        let err = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(unknown_quote)]))
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::QuoteAssetInvalid);
    }

    #[tokio::test]
    async fn test_create_trading_pair_checks() {
        let f = setup(SettingChangeConfig::default(), None);
        let stage = |asset_id: i64, base: i64, quote: i64| {
            change(vec![SettingChangeEntry::CreateTradingPair(CreateTradingPair {
                trading_pair: NewTradingPair {
                    base,
                    quote,
                    ..Default::default()
                },
                asset_id,
                exchange_id: 1,
            })])
        };

        let err = f.service.stage_change(MAIN, stage(2, 0, 1)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::TradingPairAlreadyExists);

        let err = f.service.stage_change(MAIN, stage(1, 0, 2)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::QuoteAssetInvalid);

        // OMG has no link on the exchange.
        let err = f.service.stage_change(MAIN, stage(3, 0, 1)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::BaseAssetInvalid);

        let err = f.service.stage_change(MAIN, stage(3, 2, 1)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::TradingByAssetIdInvalid);

        let err = f.service.stage_change(MAIN, stage(0, 0, 0)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::BadTradingPairConfiguration);
    }

    #[tokio::test]
    async fn test_create_trading_by_checks() {
        let f = setup(SettingChangeConfig::default(), None);
        let stage = |asset_id: i64| {
            change(vec![SettingChangeEntry::CreateTradingBy(NewTradingBy {
                asset_id,
                trading_pair_id: 100,
            })])
        };

        let err = f.service.stage_change(MAIN, stage(3)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::TradingByAssetIdInvalid);

        let err = f.service.stage_change(MAIN, stage(2)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::TradingByAlreadyExists);

        let err = f.service.stage_change(MAIN, stage(42)).await.unwrap_err();
        assert_eq!(kind_of(&err), SettingError::AssetNotExists);
    }

    #[tokio::test]
    async fn test_update_asset_checks_merged_state() {
        let f = setup(SettingChangeConfig::default(), None);

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::UpdateAsset(AssetUpdate {
                    asset_id: 2,
                    set_rate: Some(SetRate::ExchangeFeed),
                    ..Default::default()
                })]),
            )
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::PwiMissing);

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::UpdateAsset(AssetUpdate {
                    asset_id: 2,
                    symbol: Some("ETH".to_string()),
                    ..Default::default()
                })]),
            )
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), SettingError::SymbolExists);

        // Re-submitting the current address is not a collision.
        f.service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::UpdateAsset(AssetUpdate {
                    asset_id: 2,
                    address: Some(addr(2)),
                    name: Some("Kyber".to_string()),
                    ..Default::default()
                })]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_address_and_deletes() {
        let f = setup(SettingChangeConfig::default(), None);

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::ChangeAssetAddr(ChangeAssetAddress {
                    asset_id: 2,
                    address: "0xnothex".to_string(),
                })]),
            )
            .await
            .unwrap_err();
        assert!(matches!(kind_of(&err), SettingError::InvalidAddress(_)));

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::DeleteAssetExchange {
                    asset_exchange_id: 11,
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(kind_of(&err), SettingError::DeleteViolation(_)));

        let err = f
            .service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::DeleteTradingPair {
                    trading_pair_id: 5,
                }]),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        f.service
            .stage_change(
                MAIN,
                change(vec![SettingChangeEntry::DeleteTradingPair {
                    trading_pair_id: 100,
                }]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_singleton_catalog_keeps_latest() {
        let f = setup(SettingChangeConfig::default(), None);
        let catalog = ChangeCatalog::SettingChangeUpdateExchange;
        let disable = |disable: bool| {
            change(vec![SettingChangeEntry::UpdateExchange(ExchangeUpdate {
                exchange_id: 1,
                disable: Some(disable),
                ..Default::default()
            })])
        };

        let mut last = 0;
        for i in 0..3 {
            last = f.service.stage_change(catalog, disable(i % 2 == 0)).await.unwrap();
        }
        let proposals = f.service.list_proposals(catalog).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, last);

        f.service.stage_change(MAIN, disable(true)).await.unwrap();
        f.service.stage_change(MAIN, disable(false)).await.unwrap();
        assert_eq!(f.service.list_proposals(MAIN).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_and_reject_are_terminal() {
        let f = setup(SettingChangeConfig::default(), None);
        let entries = change(vec![SettingChangeEntry::CreateAsset(new_xyz())]);

        let confirmed = f.service.stage_change(MAIN, entries.clone()).await.unwrap();
        f.service.confirm_proposal(MAIN, confirmed).await.unwrap();
        assert!(f
            .service
            .confirm_proposal(MAIN, confirmed)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(f
            .service
            .reject_proposal(MAIN, confirmed)
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(f.applier.applied.lock().unwrap().len(), 1);

        let rejected = f.service.stage_change(MAIN, entries).await.unwrap();
        f.service.reject_proposal(MAIN, rejected).await.unwrap();
        assert!(f
            .service
            .reject_proposal(MAIN, rejected)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(f
            .service
            .confirm_proposal(MAIN, rejected)
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(f.applier.applied.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_fills_live_limits() {
        let provider = Arc::new(FixedExchangeInfo {
            info: Some(LiveTradingInfo {
                price_precision: 8,
                amount_precision: 3,
                amount_limit_min: 0.5,
                amount_limit_max: 5000.0,
                price_limit_min: 0.000001,
                price_limit_max: 10.0,
                min_notional: 0.01,
            }),
            requests: Mutex::new(vec![]),
        });
        let f = setup(SettingChangeConfig::default(), Some(provider.clone()));

        let id = f
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(new_xyz())]))
            .await
            .unwrap();

        assert_eq!(
            provider.requests.lock().unwrap().as_slice(),
            &[TradingPairSymbols {
                base_symbol: "XYZ".to_string(),
                quote_symbol: "ETH".to_string(),
            }]
        );
        let proposal = f.service.get_proposal(MAIN, id).unwrap();
        match &proposal.change.change_list[0] {
            SettingChangeEntry::CreateAsset(asset) => {
                let pair = &asset.exchanges[0].trading_pairs[0];
                assert_eq!(pair.price_precision, 8);
                assert_eq!(pair.min_notional, 0.01);
                assert_eq!(pair.base, 0);
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrichment_failure_policy() {
        let offline = || {
            Arc::new(FixedExchangeInfo {
                info: None,
                requests: Mutex::new(vec![]),
            })
        };

        let strict = setup(SettingChangeConfig::default(), Some(offline()));
        let err = strict
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(new_xyz())]))
            .await
            .unwrap_err();
        assert_eq!(err.entry_index(), Some(0));
        assert!(matches!(
            err,
            Error::ChangeEntry { ref source, .. } if matches!(**source, Error::ExchangeInfo(_))
        ));
        assert!(strict.pending.list(MAIN.as_str()).unwrap().is_empty());

        let lenient_config = SettingChangeConfig {
            enrichment_policy: EnrichmentPolicy::BestEffort,
            ..Default::default()
        };
        let lenient = setup(lenient_config, Some(offline()));
        let id = lenient
            .service
            .stage_change(MAIN, change(vec![SettingChangeEntry::CreateAsset(new_xyz())]))
            .await
            .unwrap();
        let proposal = lenient.service.get_proposal(MAIN, id).unwrap();
        assert_eq!(
            proposal.change,
            change(vec![SettingChangeEntry::CreateAsset(new_xyz())])
        );
    }
}
